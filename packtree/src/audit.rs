//! Sanity checks and occupancy accounting over a packing tree.
//!
//! The tree maintains its invariants on its own; the helpers here let
//! clients -- and the test suite -- verify and summarize a tree's
//! state from the outside, through the public API only.

use crate::helpe::GridSteps;
use crate::Region;

/// One-pass summary of a whole tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    pub total_cells:        GridSteps,
    pub allocated_cells:    GridSteps,
    pub free_cells:         GridSteps,
    pub leaves:             usize,
    pub depth:              usize,
}

/// Checks the structural invariants of every node in the tree:
///
/// - extents are strictly positive;
/// - the two children of a split node partition it exactly, along one
///   axis, with nothing missing and nothing shared;
/// - no split node has two free leaf children (releasing is supposed
///   to have merged those).
pub fn tree_is_valid(node: &Region) -> bool {
    if node.width < 1 || node.height < 1 {
        return false;
    }
    match node.children() {
        None => true,
        Some((a, b)) => {
            let partitioned =
                // A split is either horizontal (bottom, top)...
                (a.x == node.x
                    && b.x == node.x
                    && a.width == node.width
                    && b.width == node.width
                    && a.y == node.y
                    && b.y == a.y + a.height
                    && a.height + b.height == node.height)
                // ...or vertical (left, right).
                || (a.y == node.y
                    && b.y == node.y
                    && a.height == node.height
                    && b.height == node.height
                    && a.x == node.x
                    && b.x == a.x + a.width
                    && a.width + b.width == node.width);
            let merged = !(is_free_leaf(a) && is_free_leaf(b));
            partitioned && merged && tree_is_valid(a) && tree_is_valid(b)
        }
    }
}

#[inline(always)]
fn is_free_leaf(node: &Region) -> bool {
    node.is_leaf() && !node.is_allocated()
}

/// Every allocated leaf as `(x, y, width, height)`, in tree order.
pub fn allocated_rects(node: &Region) -> Vec<(GridSteps, GridSteps, GridSteps, GridSteps)> {
    let mut res = vec![];
    collect_allocated(node, &mut res);

    res
}

fn collect_allocated(
    node: &Region,
    out: &mut Vec<(GridSteps, GridSteps, GridSteps, GridSteps)>,
) {
    match node.children() {
        Some((a, b)) => {
            collect_allocated(a, out);
            collect_allocated(b, out);
        }
        None => {
            if node.is_allocated() {
                out.push((node.x, node.y, node.width, node.height));
            }
        }
    }
}

/// Walks the tree once and summarizes what it holds.
pub fn occupancy(node: &Region) -> Occupancy {
    let mut res = Occupancy {
        total_cells:        node.area(),
        allocated_cells:    0,
        free_cells:         0,
        leaves:             0,
        depth:              0,
    };
    walk(node, 1, &mut res);

    res
}

fn walk(node: &Region, depth: usize, out: &mut Occupancy) {
    if depth > out.depth {
        out.depth = depth;
    }
    match node.children() {
        Some((a, b)) => {
            walk(a, depth + 1, out);
            walk(b, depth + 1, out);
        }
        None => {
            out.leaves += 1;
            if node.is_allocated() {
                out.allocated_cells += node.area();
            } else {
                out.free_cells += node.area();
            }
        }
    }
}
