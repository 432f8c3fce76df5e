use crate::tree::arena::{FileTree, NodeId};

/// Which node attribute drives the child ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Size,
    Name,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Ordering applied to a directory's children before layout.
///
/// The default (size descending) is load-bearing: it feeds the squarify
/// area allocation and decides which children fall inside the always-show
/// prefix, so it stays the default even when a UI displays another order
/// elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption {
            field: SortField::Size,
            order: SortOrder::Desc,
        }
    }
}

/// Stable in-place sort of sibling ids. Ties keep their input order.
/// Missing timestamps compare as 0 (oldest).
pub fn sort_children(tree: &FileTree, children: &mut [NodeId], option: SortOption) {
    children.sort_by(|&a, &b| {
        let na = tree.get(a);
        let nb = tree.get(b);
        let ord = match option.field {
            SortField::Size => na.size.cmp(&nb.size),
            SortField::Name => na.name.cmp(&nb.name),
            SortField::Date => na.modified_at.unwrap_or(0).cmp(&nb.modified_at.unwrap_or(0)),
        };
        match option.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
