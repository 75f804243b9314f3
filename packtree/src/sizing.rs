//! Working out a sensible rectangle to allocate, given an area
//! requirement and the bounds it must fit in.

use crate::helpe::GridSteps;

/// The aspect ratio of a rectangle, normalized into `(0, 1]`: the
/// short side over the long side. `1.0` is a square.
#[inline(always)]
pub fn aspect_ratio(width: GridSteps, height: GridSteps) -> f64 {
    width.min(height) as f64 / width.max(height) as f64
}

/// Selects concrete dimensions for a rectangle which fits within
/// `bound_width * bound_height`, covers at least `area` cells, and is
/// at least as square as `min_ratio` (see [`aspect_ratio`]). Returns
/// `None` if no such rectangle exists.
///
/// Among admissible shapes, the one wasting the fewest cells wins,
/// with ties broken towards squares and then towards wider rectangles.
/// The choice is deterministic: equal inputs always produce equal
/// output.
///
/// Panics if `area` is zero or `min_ratio` lies outside `[0, 1]`.
pub fn area_to_rect(
    area: GridSteps,
    bound_width: GridSteps,
    bound_height: GridSteps,
    min_ratio: f64,
) -> Option<(GridSteps, GridSteps)> {
    assert!(area >= 1, "Zero-area rectangle requested.");
    assert!(
        (0.0..=1.0).contains(&min_ratio),
        "Aspect ratio must be in [0, 1]."
    );

    let mut best: Option<(GridSteps, GridSteps)> = None;
    for height in 1..=bound_height {
        // The narrowest width covering the area at this height...
        let mut width = area.div_ceil(height);
        // ...possibly widened to honour the aspect bound. Widening
        // can only fix shapes whose width is the short side; if the
        // ratio still fails below, the width is the long side and no
        // width works at this height.
        let from_ratio = (min_ratio * height as f64).ceil() as GridSteps;
        if from_ratio > width {
            width = from_ratio;
        }
        if width > bound_width || aspect_ratio(width, height) < min_ratio {
            continue;
        }
        let better = match best {
            Some((bw, bh)) => {
                (width * height, width.abs_diff(height)) < (bw * bh, bw.abs_diff(bh))
            }
            None => true,
        };
        if better {
            best = Some((width, height));
        }
    }

    best
}
