//! Random-workload torture tools for the `packtree` allocator.
//!
//! The driver here plays the role of the allocator's client: it fires
//! reproducible random mixes of allocations and releases at a tree and
//! cross-checks the tree against its own registry after every single
//! operation. Anything the tree promises, the driver verifies.

use ahash::AHasher;
use indexmap::IndexMap;
use packtree::{audit, sizing, GridSteps, Region};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hash::BuildHasherDefault;
use std::path::Path;

/// Live allocations, keyed by the bottom-left corner each one was
/// returned with, mapped to its dimensions.
pub type LiveSet =
    IndexMap<(GridSteps, GridSteps), (GridSteps, GridSteps), BuildHasherDefault<AHasher>>;

/// Knobs of a single churn trial.
#[derive(Debug, Clone, Copy)]
pub struct Workload {
    pub width:  GridSteps,
    pub height: GridSteps,
    /// How many operations to perform before draining.
    pub ops:    usize,
    pub seed:   u64,
    /// Probability that an operation tries to allocate rather than
    /// free, in [0, 1]. Higher values keep the tree fuller.
    pub hold:   f64,
}

/// What a finished trial reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChurnStats {
    pub allocs_ok:          usize,
    pub allocs_failed:      usize,
    pub requests_ok:        usize,
    pub requests_failed:    usize,
    pub frees:              usize,
    /// Most cells ever allocated at once.
    pub peak_cells:         GridSteps,
    /// Most leaves the tree ever fragmented into.
    pub peak_leaves:        usize,
}

/// Runs one reproducible churn trial against a fresh tree.
///
/// Every operation is followed by a full cross-check (see
/// [`check_against`]). Before draining, an optional snapshot of the
/// final placement is rendered to `snapshot`. At the end, every live
/// allocation is freed and the tree must have collapsed back to a
/// single free leaf -- the observable state of a fresh root.
pub fn run_churn(w: &Workload, snapshot: Option<&Path>) -> ChurnStats {
    let mut tree = Region::new(0, 0, w.width, w.height);
    let mut rng = StdRng::seed_from_u64(w.seed);
    let mut live = LiveSet::default();
    let mut stats = ChurnStats::default();

    for _ in 0..w.ops {
        if live.is_empty() || rng.gen::<f64>() < w.hold {
            match rng.gen_range(0u8..4) {
                // One specific cell.
                0 => {
                    let x = rng.gen_range(0..w.width);
                    let y = rng.gen_range(0..w.height);
                    match tree.request(x, y) {
                        Some(xy) => {
                            live.insert(xy, (1, 1));
                            stats.requests_ok += 1;
                        }
                        None => stats.requests_failed += 1,
                    }
                }
                // By area, with a random squareness demand.
                1 => {
                    let area = rng.gen_range(1..=w.width * w.height / 4 + 1);
                    let ratio = rng.gen_range(0.0..=1.0);
                    match tree.alloc_area(area, ratio, None) {
                        Some((x, y, rw, rh)) => {
                            assert!(rw * rh >= area);
                            assert!(sizing::aspect_ratio(rw, rh) >= ratio);
                            live.insert((x, y), (rw, rh));
                            stats.allocs_ok += 1;
                        }
                        None => stats.allocs_failed += 1,
                    }
                }
                // Plain fixed-size.
                _ => {
                    let rw = rng.gen_range(1..=w.width);
                    let rh = rng.gen_range(1..=w.height);
                    match tree.alloc(rw, rh, None) {
                        Some(xy) => {
                            live.insert(xy, (rw, rh));
                            stats.allocs_ok += 1;
                        }
                        None => stats.allocs_failed += 1,
                    }
                }
            }
        } else {
            let idx = rng.gen_range(0..live.len());
            let (&(x, y), _) = live.get_index(idx).unwrap();
            live.swap_remove(&(x, y));
            tree.free(x, y)
                .expect("freeing a live allocation must succeed");
            stats.frees += 1;
        }

        let occ = check_against(&tree, &live);
        if occ.allocated_cells > stats.peak_cells {
            stats.peak_cells = occ.allocated_cells;
        }
        if occ.leaves > stats.peak_leaves {
            stats.peak_leaves = occ.leaves;
        }
    }

    if let Some(img) = snapshot {
        plot::plot_snapshot(&tree, img);
    }

    // Drain. The corners are collected first: freeing mutates the
    // registry's reason for being.
    let corners: Vec<(GridSteps, GridSteps)> = live.keys().copied().collect();
    for (x, y) in corners {
        live.swap_remove(&(x, y));
        tree.free(x, y)
            .expect("draining a live allocation must succeed");
        stats.frees += 1;
        check_against(&tree, &live);
    }
    assert!(
        tree.is_leaf() && !tree.is_allocated(),
        "a drained tree must collapse to a single free leaf"
    );

    stats
}

/// Cross-checks the tree against the registry: the tree's structural
/// invariants hold, and its allocated leaves correspond one-to-one to
/// the outstanding placements. Returns the occupancy summary so
/// callers don't pay for a second walk.
pub fn check_against(tree: &Region, live: &LiveSet) -> audit::Occupancy {
    assert!(audit::tree_is_valid(tree), "tree invariants violated");

    let rects = audit::allocated_rects(tree);
    assert_eq!(
        rects.len(),
        live.len(),
        "allocated leaves out of sync with the registry"
    );
    let mut cells = 0;
    for (x, y, rw, rh) in rects {
        assert_eq!(
            live.get(&(x, y)),
            Some(&(rw, rh)),
            "unknown or misshapen allocation at {x}, {y}"
        );
        cells += rw * rh;
    }

    let occ = audit::occupancy(tree);
    assert_eq!(occ.allocated_cells, cells);
    assert_eq!(occ.allocated_cells + occ.free_cells, occ.total_cells);

    occ
}

pub mod plot {
    use super::*;
    use plotters::prelude::*;

    /// Renders the allocated rectangles of a tree over the root
    /// extent, one black outline per placement.
    pub fn plot_snapshot(tree: &Region, img: &Path) {
        let backend = BitMapBackend::new(img, (1024, 1024)).into_drawing_area();
        backend.fill(&WHITE).unwrap();
        let backend = backend.margin(10u32, 10u32, 10u32, 10u32);

        let mut chart = ChartBuilder::on(&backend)
            .x_label_area_size(20u32)
            .y_label_area_size(40u32)
            .build_cartesian_2d(tree.x..tree.x + tree.width, tree.y..tree.y + tree.height)
            .unwrap();

        chart
            .configure_mesh()
            .x_labels(10)
            .y_labels(10)
            .draw()
            .unwrap();

        chart.draw_series(create_series(tree)).unwrap();
        backend.present().unwrap();
    }

    fn create_series(tree: &Region) -> Vec<Rectangle<(GridSteps, GridSteps)>> {
        audit::allocated_rects(tree)
            .into_iter()
            .map(|(x, y, w, h)| {
                Rectangle::new(
                    [(x, y + h), (x + w, y)],
                    ShapeStyle {
                        color: BLACK.into(),
                        filled: false,
                        stroke_width: 1,
                    },
                )
            })
            .collect()
    }
}
