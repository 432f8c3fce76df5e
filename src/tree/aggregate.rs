use super::arena::FileTree;

/// Compute aggregated sizes and file/dir counts for all directory nodes (bottom-up).
/// After this, each directory's `size` equals the sum of all descendant file sizes
/// and its `file_count`/`dir_count` cover the whole subtree.
///
/// The layout engine never calls this: it trusts whatever totals the tree
/// carries. This exists for callers that assemble trees by hand (tests, the
/// debug-layout CLI) instead of receiving them from a scanner.
pub fn aggregate_totals(tree: &mut FileTree) {
    // Process nodes in reverse order (children before parents) since
    // children always have higher indices than their parents in our arena.
    // This is guaranteed by the add_child insertion order.
    let len = tree.nodes.len();
    for i in (0..len).rev() {
        let node = &tree.nodes[i];
        if !node.is_dir {
            continue;
        }

        // Sum up all direct children
        let mut size: u64 = 0;
        let mut files: u64 = 0;
        let mut dirs: u64 = 0;
        let mut child = node.first_child;
        while let Some(child_id) = child {
            let c = &tree.nodes[child_id.index()];
            size += c.size;
            files += c.file_count;
            dirs += c.dir_count + u64::from(c.is_dir);
            child = c.next_sibling;
        }
        tree.nodes[i].size = size;
        tree.nodes[i].file_count = files;
        tree.nodes[i].dir_count = dirs;
    }
}
