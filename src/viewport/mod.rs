use crate::layout::LayoutRect;

/// Render transform applied to the treemap: `screen = pan + zoom * layout`.
#[derive(Debug, Clone, Copy)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewTransform {
    /// Map a screen-space point into layout coordinates.
    pub fn to_layout(&self, sx: f32, sy: f32) -> (f32, f32) {
        ((sx - self.pan_x) / self.zoom, (sy - self.pan_y) / self.zoom)
    }

    /// Map a layout-space point onto the screen.
    pub fn to_screen(&self, lx: f32, ly: f32) -> (f32, f32) {
        (self.pan_x + lx * self.zoom, self.pan_y + ly * self.zoom)
    }
}

/// Configuration for viewport virtualization.
#[derive(Debug, Clone)]
pub struct VirtualizeConfig {
    /// Master switch; disabled means every rect is returned untouched
    pub enabled: bool,
    /// Extra margin (screen px) pre-rendered on each side for smooth panning
    pub overscan: f32,
    /// Below this many rects filtering costs more than it saves
    pub min_rect_count: usize,
}

impl Default for VirtualizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overscan: 120.0,
            min_rect_count: 256,
        }
    }
}

/// Rectangles intersecting the current viewport, plus their positions in the
/// full layout list.
///
/// `indices[i]` is the index of `rects[i]` in the original list, in the same
/// relative order. Selection and search-match state live as indices into the
/// full list, so this mapping is part of the contract, not a convenience.
#[derive(Debug)]
pub struct VisibleSet {
    pub rects: Vec<LayoutRect>,
    pub indices: Vec<usize>,
}

/// Narrow a layout down to the rects worth drawing for the current
/// container/zoom/pan. Pure filter: no failure modes, only an empty result
/// when nothing intersects.
pub fn virtualize(
    rects: &[LayoutRect],
    container_w: f32,
    container_h: f32,
    view: &ViewTransform,
    config: &VirtualizeConfig,
) -> VisibleSet {
    // Identity path: filtering disabled, not worth it, or the transform/container
    // is degenerate (zero extent, non-positive zoom).
    if !config.enabled
        || rects.len() < config.min_rect_count
        || container_w <= 0.0
        || container_h <= 0.0
        || view.zoom <= 0.0
    {
        return VisibleSet {
            rects: rects.to_vec(),
            indices: (0..rects.len()).collect(),
        };
    }

    // Invert the render transform to get the viewport in layout coordinates,
    // expanded by the overscan so cells entering during a pan are already drawn.
    let margin = config.overscan / view.zoom;
    let (vx0, vy0) = view.to_layout(0.0, 0.0);
    let (vx1, vy1) = view.to_layout(container_w, container_h);
    let (vx0, vy0) = (vx0 - margin, vy0 - margin);
    let (vx1, vy1) = (vx1 + margin, vy1 + margin);

    let mut visible = Vec::new();
    let mut indices = Vec::new();
    for (i, rect) in rects.iter().enumerate() {
        // AABB overlap: not fully to the left, right, above, or below.
        let outside =
            rect.x + rect.w < vx0 || rect.x > vx1 || rect.y + rect.h < vy0 || rect.y > vy1;
        if !outside {
            visible.push(rect.clone());
            indices.push(i);
        }
    }

    VisibleSet {
        rects: visible,
        indices,
    }
}

/// Hit-test: find which layout rectangle contains the given point (layout
/// coordinates). Returns the index of the topmost match — deeper rects are
/// emitted later, so the last hit wins.
pub fn hit_test(rects: &[LayoutRect], x: f32, y: f32) -> Option<usize> {
    rects
        .iter()
        .rposition(|rect| rect.contains(x, y))
}
