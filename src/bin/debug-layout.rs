/// Diagnostic tool to verify the tree → layout → virtualize pipeline
/// against a real directory.
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use anyhow::Result;
use jwalk::WalkDir;

use canopymap::layout::{compute_layout, Bounds, LayoutConfig, SortOption};
use canopymap::tree::aggregate::aggregate_totals;
use canopymap::tree::arena::{FileNode, FileTree, NodeId};
use canopymap::viewport::{virtualize, ViewTransform, VirtualizeConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("canopymap=debug".parse().unwrap()),
        )
        .init();

    let scan_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    println!("=== DIAGNOSTIC: Tree → Layout → Virtualize Pipeline ===");
    println!("Walking: {}", scan_path.display());

    let tree = walk_into_tree(&scan_path)?;
    let root_node = tree.get(tree.root);
    println!(
        "\n[1] Tree built: {} nodes ({} files, {} dirs, {:.2} GB)",
        tree.len(),
        root_node.file_count,
        root_node.dir_count,
        root_node.size as f64 / 1_073_741_824.0
    );

    // Compute layout
    let config = LayoutConfig::default();
    let layout = compute_layout(
        &tree,
        tree.root,
        Bounds::new(0.0, 0.0, 1920.0, 1080.0),
        SortOption::default(),
        &config,
    );
    println!("\n[2] Layout computed: {} rectangles", layout.rects.len());

    // Show top 10 largest rectangles
    println!("\n[3] Top 10 largest rectangles by area:");
    let mut sorted_rects = layout.rects.clone();
    sorted_rects.sort_by(|a, b| b.area().partial_cmp(&a.area()).unwrap());

    for (i, rect) in sorted_rects.iter().take(10).enumerate() {
        let name = match rect.node() {
            Some(id) => tree.get(id).name.to_string(),
            None => "(aggregate)".to_string(),
        };
        println!(
            "    [{}] '{}' - {:.1}x{:.1} ({:.0}px²) at ({:.1}, {:.1}) depth={} container={}",
            i,
            name,
            rect.w,
            rect.h,
            rect.area(),
            rect.x,
            rect.y,
            rect.depth,
            rect.is_container()
        );
    }

    // Check for anomalies
    println!("\n[4] Checking for anomalies:");
    let mut out_of_bounds = 0usize;
    let mut negative = 0usize;
    let mut max_depth = 0u16;
    for rect in &layout.rects {
        if rect.w < 0.0 || rect.h < 0.0 {
            negative += 1;
        }
        if rect.x < -0.01
            || rect.y < -0.01
            || rect.x + rect.w > 1920.01
            || rect.y + rect.h > 1080.01
        {
            out_of_bounds += 1;
        }
        max_depth = max_depth.max(rect.depth);
    }
    println!("    Negative dimensions: {}", negative);
    println!("    Out of bounds:       {}", out_of_bounds);
    println!("    Max depth:           {} (cap {})", max_depth, config.max_depth);

    let aggregates = layout.rects.iter().filter(|r| r.is_aggregate()).count();
    println!("    Aggregate blocks:    {}", aggregates);

    // Virtualization sample: zoomed 2x into the center of the viewport
    let view = ViewTransform {
        zoom: 2.0,
        pan_x: -960.0,
        pan_y: -540.0,
    };
    let visible = virtualize(
        &layout.rects,
        1920.0,
        1080.0,
        &view,
        &VirtualizeConfig::default(),
    );
    println!(
        "\n[5] Virtualized at zoom=2 center pan: {} of {} rects visible",
        visible.rects.len(),
        layout.rects.len()
    );

    Ok(())
}

/// Walk a directory with jwalk and assemble the arena tree.
/// Parents are yielded before children, so a path → id map suffices.
fn walk_into_tree(root: &PathBuf) -> Result<FileTree> {
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());
    let mut tree = FileTree::new(&root_name);

    let mut path_map: HashMap<PathBuf, NodeId> = HashMap::new();
    path_map.insert(root.clone(), tree.root);

    for entry in WalkDir::new(root).skip_hidden(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Walk error: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if path == *root {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("No metadata for {}: {}", path.display(), e);
                continue;
            }
        };

        let parent_id = path
            .parent()
            .and_then(|p| path_map.get(p).copied())
            .unwrap_or(tree.root);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut node = if metadata.is_dir() {
            FileNode::dir(&name)
        } else {
            FileNode::file(&name, metadata.len())
        };
        if let Ok(modified) = metadata.modified() {
            if let Ok(secs) = modified.duration_since(UNIX_EPOCH) {
                node = node.with_modified(secs.as_secs());
            }
        }

        let id = tree.add_child(parent_id, node);
        if metadata.is_dir() {
            path_map.insert(path, id);
        }
    }

    aggregate_totals(&mut tree);
    Ok(tree)
}
