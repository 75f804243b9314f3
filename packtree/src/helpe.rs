//! Useful stuff that shall be needed in many places: type aliases,
//! the library error, common re-exports.

pub use itertools::Itertools;
pub use thiserror::Error;

/// The unit for measuring grid coordinates and extents. `packtree` does
/// not care what a cell *is* -- a board, a texture block, a seat -- as
/// long as everything lives on a non-negative integer grid.
pub type GridSteps = usize;

/// A caller-supplied veto over candidate placements. It receives the
/// candidate's bottom-left corner and dimensions; returning `false`
/// sends the allocator looking for another spot.
///
/// The tree consults the filter at leaf corners only, never on the
/// children of a split in progress, so whatever the filter observes is
/// a placement that could actually be handed out. It must be pure: the
/// tree may call it any number of times per allocation.
pub type CandidateFilter<'a> =
    &'a dyn Fn(GridSteps, GridSteps, GridSteps, GridSteps) -> bool;

/// Appears when releasing a region fails. Freeing demands the exact
/// bottom-left corner of a currently allocated region; anything else
/// is a caller bug and gets reported loudly instead of being ignored.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeError {
    #[error("Cannot free non-allocated region {0}, {1}.")]
    NotAllocated(GridSteps, GridSteps),
    #[error("Cannot free {0}, {1} which is outside the region.")]
    Outside(GridSteps, GridSteps),
}
