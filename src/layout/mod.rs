pub mod sort;
mod squarify;

use std::collections::HashMap;

use compact_str::{format_compact, CompactString};

use crate::tree::arena::{FileTree, NodeId};
use squarify::squarify;

pub use sort::{SortField, SortOption, SortOrder};

/// Axis-aligned bounds in device-independent pixels.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Bounds { x, y, w, h }
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }
}

/// What a placed rectangle stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// A file, or a directory rendered flat (empty, too small, or too deep to nest)
    Leaf(NodeId),
    /// A directory whose children are laid out nested inside this rectangle
    Container(NodeId),
    /// Synthetic block folding small siblings together
    Aggregate(AggregateBlock),
}

/// Metadata carried by an aggregation block.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateBlock {
    /// Display label ("+N more")
    pub label: CompactString,
    /// How many siblings were folded in
    pub count: usize,
    /// Their combined size in bytes
    pub total_size: u64,
    /// First few folded nodes, kept for expand/disclosure UI
    pub preview: Vec<NodeId>,
}

/// A positioned rectangle in the treemap layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRect {
    pub kind: CellKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub depth: u16,
}

impl LayoutRect {
    /// The originating tree node, if any (aggregates have none).
    pub fn node(&self) -> Option<NodeId> {
        match self.kind {
            CellKind::Leaf(id) | CellKind::Container(id) => Some(id),
            CellKind::Aggregate(_) => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, CellKind::Container(_))
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.kind, CellKind::Aggregate(_))
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Point containment in layout coordinates (half-open on the far edges).
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// The full layout result (rects + fast lookup).
#[derive(Debug)]
pub struct Layout {
    /// All placed rectangles (leaves, containers, aggregates).
    /// Downstream selection/search state indexes into this exact list.
    pub rects: Vec<LayoutRect>,
    /// node → index into `rects` (O(1) hover, tooltip, highlighting).
    /// Aggregate blocks have no node and are absent here.
    pub node_to_rect: HashMap<NodeId, usize>,
}

/// Configuration for treemap layout.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Minimum screen area (px²) below which children fold into the "+N more" block
    pub min_area: f32,
    /// Maximum nesting depth for emitted rectangles
    pub max_depth: u16,
    /// Header strip reserved inside containers tall enough to show one (px)
    pub header_height: f32,
    /// Base padding inset inside containers (px); tapers with depth
    pub base_padding: f32,
    /// Leading children (in sort order) exempt from area-based aggregation
    pub always_show: usize,
    /// Minimum folded items before an aggregate block is emitted
    pub min_aggregate_count: usize,
    /// How many folded nodes the aggregate block keeps for disclosure UI
    pub aggregate_preview: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_area: 16.0,
            max_depth: 3,
            header_height: 18.0,
            base_padding: 4.0,
            always_show: 30,
            min_aggregate_count: 2,
            aggregate_preview: 5,
        }
    }
}

/// A directory must be allotted at least this much room before its children nest inside it.
const NEST_MIN_W: f32 = 60.0;
const NEST_MIN_H: f32 = 50.0;

/// Thinnest an aggregate block may get after clamping.
const AGGREGATE_MIN_SIDE: f32 = 4.0;

/// Compute the layout for any subtree (root can be any node for drill-down).
///
/// Pure and deterministic: identical tree, bounds, sort, and config produce
/// bit-identical output. The tree is only borrowed for the duration of the call.
pub fn compute_layout(
    tree: &FileTree,
    root: NodeId,
    bounds: Bounds,
    sort: SortOption,
    config: &LayoutConfig,
) -> Layout {
    let mut rects = Vec::with_capacity(tree.len() / 4);
    let mut node_to_rect = HashMap::new();

    let node = tree.get(root);
    if node.size == 0 || bounds.w < 1.0 || bounds.h < 1.0 {
        tracing::debug!(
            "Nothing to lay out for '{}' ({}x{} bounds, {} bytes)",
            node.name,
            bounds.w,
            bounds.h,
            node.size
        );
        return Layout { rects, node_to_rect };
    }

    layout_node(tree, root, bounds, 0, sort, config, &mut rects, &mut node_to_rect);

    Layout { rects, node_to_rect }
}

/// Lay out one node into `bounds`. Bounds are at least 1px in each dimension here.
fn layout_node(
    tree: &FileTree,
    node_id: NodeId,
    bounds: Bounds,
    depth: u16,
    sort: SortOption,
    config: &LayoutConfig,
    rects: &mut Vec<LayoutRect>,
    node_to_rect: &mut HashMap<NodeId, usize>,
) {
    // Children with representable size, in the requested order.
    let mut children: Vec<NodeId> = tree
        .children(node_id)
        .filter(|&id| tree.get(id).size > 0)
        .collect();
    sort::sort_children(tree, &mut children, sort);

    if children.is_empty() {
        // Files, empty directories, and directories whose children all have
        // zero size render as one cell covering the whole allotment.
        push_rect(
            rects,
            node_to_rect,
            LayoutRect {
                kind: CellKind::Leaf(node_id),
                x: bounds.x,
                y: bounds.y,
                w: bounds.w,
                h: bounds.h,
                depth,
            },
        );
        return;
    }

    if depth == 0 {
        tracing::debug!(
            "Laying out {} children of '{}' in {:.0}x{:.0} bounds",
            children.len(),
            tree.get(node_id).name,
            bounds.w,
            bounds.h
        );
    }

    // Target areas normalized against the children's own sum, so trees whose
    // directory sizes disagree with their children still fill the bounds.
    let total: f64 = children.iter().map(|&id| tree.get(id).size as f64).sum();
    let bounds_area = bounds.w as f64 * bounds.h as f64;
    let areas: Vec<f64> = children
        .iter()
        .map(|&id| (tree.get(id).size as f64 / total) * bounds_area)
        .collect();

    let slots = squarify(
        &areas,
        bounds.x as f64,
        bounds.y as f64,
        bounds.w as f64,
        bounds.h as f64,
    );

    let mut bucket = AggregateBucket::default();

    for (i, slot) in slots.iter().enumerate() {
        let child_id = children[i];
        let area = slot.area() as f32;

        // Area gate: unrepresentable slots always fold; merely small ones
        // fold unless the child sits in the always-show prefix.
        if area <= 0.0 || (area < config.min_area && i >= config.always_show) {
            bucket.fold(child_id, tree.get(child_id).size, config.aggregate_preview);
            continue;
        }

        let cx = slot.x as f32;
        let cy = slot.y as f32;
        let cw = slot.w as f32;
        let ch = slot.h as f32;

        let child = tree.get(child_id);
        let nests = child.is_dir
            && depth < config.max_depth
            && cw > NEST_MIN_W
            && ch > NEST_MIN_H
            && tree.children(child_id).any(|c| tree.get(c).size > 0);

        if nests {
            push_rect(
                rects,
                node_to_rect,
                LayoutRect {
                    kind: CellKind::Container(child_id),
                    x: cx,
                    y: cy,
                    w: cw,
                    h: ch,
                    depth,
                },
            );
            if let Some(inner) = inset_bounds(cx, cy, cw, ch, depth, config) {
                layout_node(tree, child_id, inner, depth + 1, sort, config, rects, node_to_rect);
            }
        } else {
            push_rect(
                rects,
                node_to_rect,
                LayoutRect {
                    kind: CellKind::Leaf(child_id),
                    x: cx,
                    y: cy,
                    w: cw,
                    h: ch,
                    depth,
                },
            );
        }
    }

    // At most one aggregate block per level.
    if bucket.count >= config.min_aggregate_count && bucket.total_size > 0 {
        if let Some(rect) = bucket.into_rect(total, bounds, depth, config) {
            rects.push(rect);
        }
    }
}

fn push_rect(
    rects: &mut Vec<LayoutRect>,
    node_to_rect: &mut HashMap<NodeId, usize>,
    rect: LayoutRect,
) {
    if let Some(node) = rect.node() {
        node_to_rect.insert(node, rects.len());
    }
    rects.push(rect);
}

/// Inner bounds for nested children: padding tapers with depth, and a header
/// strip is reserved only when the rectangle is tall enough to show one.
/// Returns None when the inset leaves no usable room.
fn inset_bounds(x: f32, y: f32, w: f32, h: f32, depth: u16, config: &LayoutConfig) -> Option<Bounds> {
    let pad = (config.base_padding - depth as f32).max(2.0);
    let header = if h > config.header_height * 2.0 {
        config.header_height
    } else {
        0.0
    };
    let inner = Bounds::new(x + pad, y + pad + header, w - 2.0 * pad, h - 2.0 * pad - header);
    if inner.w < 1.0 || inner.h < 1.0 {
        None
    } else {
        Some(inner)
    }
}

/// Children diverted from placement at one level, folded into a single block.
#[derive(Default)]
struct AggregateBucket {
    count: usize,
    total_size: u64,
    preview: Vec<NodeId>,
}

impl AggregateBucket {
    fn fold(&mut self, id: NodeId, size: u64, preview_cap: usize) {
        if self.preview.len() < preview_cap {
            self.preview.push(id);
        }
        self.count += 1;
        self.total_size += size;
    }

    /// Place the block along the trailing edge of the level's bounds, sized by
    /// its proportional share and clamped to stay visible. Suppressed when the
    /// share stays below half the area threshold.
    fn into_rect(
        self,
        level_total: f64,
        bounds: Bounds,
        depth: u16,
        config: &LayoutConfig,
    ) -> Option<LayoutRect> {
        let share = self.total_size as f64 / level_total;
        let agg_area = (share * bounds.w as f64 * bounds.h as f64) as f32;
        if agg_area < config.min_area * 0.5 {
            return None;
        }

        let (x, y, w, h) = if bounds.w >= bounds.h {
            // Horizontally dominant level: strip along the right edge.
            let t = (agg_area / bounds.h).max(AGGREGATE_MIN_SIDE).min(bounds.w);
            (bounds.x + bounds.w - t, bounds.y, t, bounds.h)
        } else {
            let t = (agg_area / bounds.w).max(AGGREGATE_MIN_SIDE).min(bounds.h);
            (bounds.x, bounds.y + bounds.h - t, bounds.w, t)
        };

        Some(LayoutRect {
            kind: CellKind::Aggregate(AggregateBlock {
                label: format_compact!("+{} more", self.count),
                count: self.count,
                total_size: self.total_size,
                preview: self.preview,
            }),
            x,
            y,
            w,
            h,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::aggregate::aggregate_totals;
    use crate::tree::arena::{FileNode, FileTree};

    fn flat_tree(sizes: &[u64]) -> FileTree {
        let mut tree = FileTree::new("root");
        for (i, &size) in sizes.iter().enumerate() {
            tree.add_child(tree.root, FileNode::file(&format!("f{i}"), size));
        }
        aggregate_totals(&mut tree);
        tree
    }

    fn bounds(w: f32, h: f32) -> Bounds {
        Bounds::new(0.0, 0.0, w, h)
    }

    fn layout(tree: &FileTree, b: Bounds) -> Layout {
        compute_layout(tree, tree.root, b, SortOption::default(), &LayoutConfig::default())
    }

    #[test]
    fn zero_size_root_yields_empty() {
        let tree = FileTree::new("root");
        let result = layout(&tree, bounds(100.0, 100.0));
        assert!(result.rects.is_empty());
    }

    #[test]
    fn zero_extent_bounds_yield_empty() {
        let tree = flat_tree(&[100, 200]);
        assert!(layout(&tree, bounds(0.0, 100.0)).rects.is_empty());
        assert!(layout(&tree, bounds(100.0, 0.0)).rects.is_empty());
    }

    #[test]
    fn single_child_covers_full_bounds() {
        let tree = flat_tree(&[500]);
        let result = layout(&tree, bounds(100.0, 100.0));
        assert_eq!(result.rects.len(), 1);
        let r = &result.rects[0];
        assert!(!r.is_container());
        assert!((r.x).abs() < 1e-3 && (r.y).abs() < 1e-3);
        assert!((r.w - 100.0).abs() < 1e-3);
        assert!((r.h - 100.0).abs() < 1e-3);
    }

    #[test]
    fn childless_node_with_stated_size_is_one_leaf() {
        // Corrupted input: a directory claiming bytes it has no children for.
        let mut tree = FileTree::new("root");
        tree.get_mut(tree.root).size = 1234;
        let result = layout(&tree, bounds(200.0, 100.0));
        assert_eq!(result.rects.len(), 1);
        assert_eq!(result.rects[0].node(), Some(tree.root));
        assert!((result.rects[0].area() - 20000.0).abs() < 1e-2);
    }

    #[test]
    fn size_descending_areas_are_non_increasing() {
        let tree = flat_tree(&[300, 200, 100]);
        let result = layout(&tree, bounds(100.0, 100.0));
        assert_eq!(result.rects.len(), 3);
        let areas: Vec<f32> = result.rects.iter().map(|r| r.area()).collect();
        assert!(areas[0] >= areas[1] - 1e-3);
        assert!(areas[1] >= areas[2] - 1e-3);
    }

    #[test]
    fn size_ascending_areas_are_non_decreasing() {
        let tree = flat_tree(&[300, 200, 100]);
        let result = compute_layout(
            &tree,
            tree.root,
            bounds(100.0, 100.0),
            SortOption {
                field: SortField::Size,
                order: SortOrder::Asc,
            },
            &LayoutConfig::default(),
        );
        let areas: Vec<f32> = result.rects.iter().map(|r| r.area()).collect();
        assert!(areas[0] <= areas[1] + 1e-3);
        assert!(areas[1] <= areas[2] + 1e-3);
    }

    #[test]
    fn name_ascending_emits_lexicographic_leaves() {
        let mut tree = FileTree::new("root");
        tree.add_child(tree.root, FileNode::file("zebra", 100));
        tree.add_child(tree.root, FileNode::file("apple", 200));
        tree.add_child(tree.root, FileNode::file("mango", 150));
        aggregate_totals(&mut tree);

        let result = compute_layout(
            &tree,
            tree.root,
            bounds(100.0, 100.0),
            SortOption {
                field: SortField::Name,
                order: SortOrder::Asc,
            },
            &LayoutConfig::default(),
        );
        let names: Vec<&str> = result
            .rects
            .iter()
            .map(|r| tree.get(r.node().unwrap()).name.as_str())
            .collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn areas_are_proportional_to_sizes() {
        let tree = flat_tree(&[750, 250]);
        let result = layout(&tree, bounds(100.0, 100.0));
        assert_eq!(result.rects.len(), 2);
        let big = result.rects[0].area();
        let small = result.rects[1].area();
        assert!(big > small);
        assert!((big - 7500.0).abs() < 1.0);
        assert!((small - 2500.0).abs() < 1.0);
    }

    #[test]
    fn every_rect_stays_inside_the_call_bounds() {
        let mut tree = FileTree::new("root");
        let docs = tree.add_child(tree.root, FileNode::dir("docs"));
        for i in 0..8 {
            tree.add_child(docs, FileNode::file(&format!("d{i}"), 100 + i * 10));
        }
        let media = tree.add_child(tree.root, FileNode::dir("media"));
        for i in 0..5 {
            tree.add_child(media, FileNode::file(&format!("m{i}"), 400 + i * 50));
        }
        tree.add_child(tree.root, FileNode::file("loose.bin", 900));
        aggregate_totals(&mut tree);

        let b = Bounds::new(10.0, 20.0, 300.0, 200.0);
        let result = layout(&tree, b);
        assert!(!result.rects.is_empty());
        for r in &result.rects {
            assert!(r.w >= 0.0 && r.h >= 0.0);
            assert!(r.x >= b.x - 1e-2, "x underflow: {r:?}");
            assert!(r.y >= b.y - 1e-2, "y underflow: {r:?}");
            assert!(r.x + r.w <= b.x + b.w + 1e-2, "x overflow: {r:?}");
            assert!(r.y + r.h <= b.y + b.h + 1e-2, "y overflow: {r:?}");
        }
    }

    #[test]
    fn deep_chain_is_capped_at_max_depth() {
        let mut tree = FileTree::new("root");
        let mut parent = tree.root;
        for i in 0..6 {
            parent = tree.add_child(parent, FileNode::dir(&format!("level{i}")));
        }
        tree.add_child(parent, FileNode::file("leaf.bin", 1_000_000));
        aggregate_totals(&mut tree);

        let result = layout(&tree, bounds(500.0, 500.0));
        let max_depth = result.rects.iter().map(|r| r.depth).max().unwrap();
        assert!(max_depth <= 3, "max depth {max_depth}");

        // The cut-off directory is represented by a leaf, not omitted.
        assert!(result
            .rects
            .iter()
            .any(|r| r.depth == 3 && !r.is_container()));
    }

    #[test]
    fn container_children_nest_inside_its_bounds() {
        let mut tree = FileTree::new("root");
        let dir = tree.add_child(tree.root, FileNode::dir("bulk"));
        tree.add_child(dir, FileNode::file("a", 600));
        tree.add_child(dir, FileNode::file("b", 400));
        aggregate_totals(&mut tree);

        let result = layout(&tree, bounds(400.0, 300.0));
        let container_idx = result.node_to_rect[&dir];
        let container = &result.rects[container_idx];
        assert!(container.is_container());
        assert_eq!(container.depth, 0);

        let inner: Vec<&LayoutRect> =
            result.rects.iter().filter(|r| r.depth == 1).collect();
        assert_eq!(inner.len(), 2);
        for r in inner {
            assert!(r.x >= container.x && r.y >= container.y);
            assert!(r.x + r.w <= container.x + container.w + 1e-2);
            assert!(r.y + r.h <= container.y + container.h + 1e-2);
        }
    }

    #[test]
    fn cramped_directory_stays_a_leaf() {
        let mut tree = FileTree::new("root");
        tree.add_child(tree.root, FileNode::file("big", 95_000));
        let dir = tree.add_child(tree.root, FileNode::dir("tiny-dir"));
        tree.add_child(dir, FileNode::file("inner", 5_000));
        aggregate_totals(&mut tree);

        // 100x100 bounds: the dir gets ~5% of the area, well under 60x50.
        let result = layout(&tree, bounds(100.0, 100.0));
        let rect = &result.rects[result.node_to_rect[&dir]];
        assert!(!rect.is_container());
    }

    #[test]
    fn small_tail_folds_into_one_aggregate() {
        // 1 big child + 40 of size 1: the always-show prefix (30) protects the
        // big one and the first 29 small ones; the remaining 11 fold.
        let mut sizes = vec![9960u64];
        sizes.extend(std::iter::repeat(1).take(40));
        let tree = flat_tree(&sizes);

        let result = layout(&tree, bounds(100.0, 100.0));
        let aggregates: Vec<&LayoutRect> =
            result.rects.iter().filter(|r| r.is_aggregate()).collect();
        assert_eq!(aggregates.len(), 1);

        let CellKind::Aggregate(block) = &aggregates[0].kind else {
            unreachable!()
        };
        assert_eq!(block.count, 11);
        assert_eq!(block.total_size, 11);
        assert_eq!(block.label.as_str(), "+11 more");
        assert_eq!(block.preview.len(), 5);
    }

    #[test]
    fn unprotected_small_children_all_fold() {
        let mut sizes = vec![9980u64];
        sizes.extend(std::iter::repeat(1).take(20));
        let tree = flat_tree(&sizes);

        let config = LayoutConfig {
            always_show: 1,
            ..LayoutConfig::default()
        };
        let result = compute_layout(
            &tree,
            tree.root,
            bounds(100.0, 100.0),
            SortOption::default(),
            &config,
        );

        assert_eq!(result.rects.len(), 2);
        let CellKind::Aggregate(block) = &result.rects[1].kind else {
            panic!("expected trailing aggregate, got {:?}", result.rects[1]);
        };
        assert_eq!(block.count, 20);
        assert_eq!(block.total_size, 20);
        assert_eq!(block.label.as_str(), "+20 more");
    }

    #[test]
    fn single_straggler_is_dropped_without_aggregate() {
        let mut sizes = vec![1000u64; 30];
        sizes.push(1);
        let tree = flat_tree(&sizes);

        let result = layout(&tree, bounds(100.0, 100.0));
        assert!(!result.rects.iter().any(|r| r.is_aggregate()));
        assert_eq!(result.rects.len(), 30);
    }

    #[test]
    fn emitted_rects_meet_the_area_threshold_unless_protected() {
        // Each size-30 straggler lands near 10 px² (under the 16 px² gate),
        // while the folded block's combined share clears suppression.
        let mut sizes = vec![1000u64; 30];
        sizes.extend([30, 30, 30, 30, 30]);
        let tree = flat_tree(&sizes);

        let result = layout(&tree, bounds(100.0, 100.0));
        let config = LayoutConfig::default();
        for r in &result.rects {
            if !r.is_aggregate() {
                assert!(r.area() >= config.min_area - 1e-3, "undersized rect: {r:?}");
            }
        }
        assert!(result.rects.iter().any(|r| r.is_aggregate()));
    }

    #[test]
    fn corrupted_directory_sizes_do_not_panic() {
        // Parent claims 5 bytes; children sum to 3000. Layout follows the
        // children and still fills the bounds.
        let mut tree = FileTree::new("root");
        tree.add_child(tree.root, FileNode::file("a", 2000));
        tree.add_child(tree.root, FileNode::file("b", 1000));
        tree.get_mut(tree.root).size = 5;

        let result = layout(&tree, bounds(100.0, 100.0));
        assert_eq!(result.rects.len(), 2);
        let covered: f32 = result.rects.iter().map(|r| r.area()).sum();
        assert!((covered - 10000.0).abs() < 1.0);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let mut sizes = vec![9960u64];
        sizes.extend(std::iter::repeat(1).take(40));
        let tree = flat_tree(&sizes);

        let a = layout(&tree, bounds(317.0, 211.0));
        let b = layout(&tree, bounds(317.0, 211.0));
        assert_eq!(a.rects, b.rects);
    }

    #[test]
    fn node_to_rect_points_at_the_right_entries() {
        let mut tree = FileTree::new("root");
        let dir = tree.add_child(tree.root, FileNode::dir("dir"));
        let inner = tree.add_child(dir, FileNode::file("inner", 700));
        let loose = tree.add_child(tree.root, FileNode::file("loose", 300));
        aggregate_totals(&mut tree);

        let result = layout(&tree, bounds(400.0, 300.0));
        for id in [dir, inner, loose] {
            let idx = result.node_to_rect[&id];
            assert_eq!(result.rects[idx].node(), Some(id));
        }
    }
}
