/// Squarified partitioning (Bruls, Huizing & van Wijk): greedy row accumulation
/// along the shorter side of the remaining bounds.
///
/// Returns exactly one slot per input area, in input order. The caller's
/// ordering is load-bearing (it decides aggregation and always-show
/// protection), so areas are never re-sorted here. Areas that no longer fit
/// in the remaining space degenerate to zero-sized slots at the cursor
/// instead of being dropped, keeping the area↔slot pairing intact.
pub(crate) fn squarify(areas: &[f64], mut x: f64, mut y: f64, mut w: f64, mut h: f64) -> Vec<Positioned> {
    let mut result = Vec::with_capacity(areas.len());
    let mut row: Vec<f64> = Vec::new();
    let mut row_sum = 0.0f64;

    for &area in areas {
        let short = w.min(h);

        if row.is_empty() {
            row.push(area);
            row_sum = area;
            continue;
        }

        // Keep the candidate only if it does not worsen the row's worst ratio.
        let current = worst_aspect_ratio(&row, row_sum, short);
        row.push(area);
        let with_candidate = worst_aspect_ratio(&row, row_sum + area, short);

        if with_candidate <= current {
            row_sum += area;
        } else {
            row.pop();
            flush_row(&row, row_sum, &mut x, &mut y, &mut w, &mut h, &mut result);
            row.clear();
            row.push(area);
            row_sum = area;
        }
    }

    if !row.is_empty() {
        flush_row(&row, row_sum, &mut x, &mut y, &mut w, &mut h, &mut result);
    }

    result
}

/// Lay one accumulated row into the remaining bounds, consuming its thickness
/// from the longer side. `x/y/w/h` track the remaining bounds across calls.
fn flush_row(
    row: &[f64],
    row_sum: f64,
    x: &mut f64,
    y: &mut f64,
    w: &mut f64,
    h: &mut f64,
    out: &mut Vec<Positioned>,
) {
    // Guard against degenerate cases: exhausted space or an all-zero row
    // produce empty slots at the cursor rather than NaN geometry.
    if *w <= 1e-6 || *h <= 1e-6 || row_sum <= 0.0 {
        for _ in row {
            out.push(Positioned { x: *x, y: *y, w: 0.0, h: 0.0 });
        }
        return;
    }

    // Wide remainder: the row is a column spanning the (shorter) height,
    // cutting its thickness from the width. Tall remainder: vice versa.
    let horizontal = *w >= *h;
    let side = if horizontal { *h } else { *w };
    let thickness = row_sum / side.max(1e-8);

    let mut offset = 0.0;
    for &area in row {
        let length = area / thickness.max(1e-8);

        if !length.is_finite() || !thickness.is_finite() || length < 0.0 {
            tracing::warn!(
                "Squarify: invalid dimensions (length={}, thickness={}, area={}, side={}), emitting empty slot",
                length, thickness, area, side
            );
            out.push(Positioned { x: *x, y: *y, w: 0.0, h: 0.0 });
            continue;
        }

        let pos = if horizontal {
            Positioned {
                x: *x,
                y: *y + offset,
                w: thickness,
                h: length,
            }
        } else {
            Positioned {
                x: *x + offset,
                y: *y,
                w: length,
                h: thickness,
            }
        };
        out.push(pos);
        offset += length;
    }

    // Shrink remaining space
    if horizontal {
        *x += thickness;
        *w = (*w - thickness).max(0.0);
    } else {
        *y += thickness;
        *h = (*h - thickness).max(0.0);
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Positioned {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Positioned {
    pub fn area(&self) -> f64 {
        self.w * self.h
    }
}

fn worst_aspect_ratio(row: &[f64], sum: f64, side: f64) -> f64 {
    if row.is_empty() || sum <= 0.0 || side <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let max_r = row.iter().copied().fold(0.0, f64::max);
    let min_r = row.iter().copied().fold(f64::INFINITY, f64::min);
    if min_r <= 0.0 {
        return f64::MAX;
    }
    let a = (side_sq * max_r) / sum_sq;
    let b = sum_sq / (side_sq * min_r);
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::squarify;

    #[test]
    fn single_item_fills_viewport_without_axis_swap() {
        let rects = squarify(&[1920.0 * 1080.0], 0.0, 0.0, 1920.0, 1080.0);
        assert_eq!(rects.len(), 1);
        let r = rects[0];
        assert!((r.w - 1920.0).abs() < 1e-6);
        assert!((r.h - 1080.0).abs() < 1e-6);
    }

    #[test]
    fn layout_preserves_area_for_simple_case() {
        let areas = [400.0, 300.0, 200.0, 100.0];
        let rects = squarify(&areas, 0.0, 0.0, 50.0, 20.0);
        let total_in: f64 = areas.iter().sum();
        let total_out: f64 = rects.iter().map(|r| r.area()).sum();
        assert!((total_in - total_out).abs() < 1e-6);
    }

    #[test]
    fn slots_come_back_in_input_order() {
        // Deliberately unsorted input: the pairing must not be reshuffled.
        let areas = [100.0, 400.0, 250.0, 250.0];
        let rects = squarify(&areas, 0.0, 0.0, 40.0, 25.0);
        assert_eq!(rects.len(), areas.len());
        for (r, &a) in rects.iter().zip(&areas) {
            assert!((r.area() - a).abs() < 1e-6);
        }
    }

    #[test]
    fn every_slot_stays_inside_the_bounds() {
        let areas = [500.0, 300.0, 120.0, 50.0, 20.0, 10.0];
        let rects = squarify(&areas, 10.0, 5.0, 50.0, 20.0);
        for r in &rects {
            assert!(r.x >= 10.0 - 1e-6);
            assert!(r.y >= 5.0 - 1e-6);
            assert!(r.x + r.w <= 60.0 + 1e-6);
            assert!(r.y + r.h <= 25.0 + 1e-6);
        }
    }

    #[test]
    fn exhausted_space_degenerates_to_empty_slots() {
        // Areas sum to far more than the bounds can hold after the first row
        // consumes everything; leftovers must still get (empty) slots.
        let areas = [200.0, 1e-9, 1e-9];
        let rects = squarify(&areas, 0.0, 0.0, 20.0, 10.0);
        assert_eq!(rects.len(), 3);
        assert!(rects[0].area() > 0.0);
    }
}
