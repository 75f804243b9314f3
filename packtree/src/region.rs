use crate::helpe::*;
use crate::sizing::area_to_rect;
use crate::{Body, Region};
use itertools::iproduct;

impl Region {
    /// Defines a region which may be allocated and/or divided in two.
    ///
    /// `(x, y)` is the absolute location of the bottom-left corner;
    /// `width` and `height` must both be at least 1.
    pub fn new(x: GridSteps, y: GridSteps, width: GridSteps, height: GridSteps) -> Self {
        assert!(width >= 1 && height >= 1, "Zero-sized region requested.");
        Self {
            x,
            y,
            width,
            height,
            body: Body::Leaf { allocated: false },
        }
    }

    /// Tests whether a coordinate is inside this region.
    #[inline(always)]
    pub fn contains(&self, x: GridSteps, y: GridSteps) -> bool {
        self.x <= x && x < self.x + self.width && self.y <= y && y < self.y + self.height
    }

    #[inline(always)]
    pub fn area(&self) -> GridSteps {
        self.width * self.height
    }

    /// Returns `true` if this node has no children.
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        matches!(self.body, Body::Leaf { .. })
    }

    /// Returns `true` if this node is an allocated leaf. Split nodes
    /// are never allocated themselves.
    #[inline(always)]
    pub fn is_allocated(&self) -> bool {
        matches!(self.body, Body::Leaf { allocated: true })
    }

    #[inline(always)]
    fn is_free_leaf(&self) -> bool {
        matches!(self.body, Body::Leaf { allocated: false })
    }

    /// The node's children, in (left, right) or (bottom, top) order.
    #[inline]
    pub fn children(&self) -> Option<(&Region, &Region)> {
        match &self.body {
            Body::Split(pair) => Some((&pair.0, &pair.1)),
            Body::Leaf { .. } => None,
        }
    }

    #[inline]
    fn children_mut(&mut self) -> Option<(&mut Region, &mut Region)> {
        match &mut self.body {
            Body::Split(pair) => {
                let (a, b) = &mut **pair;
                Some((a, b))
            }
            Body::Leaf { .. } => None,
        }
    }

    // Turns a free leaf into an allocated one.
    #[inline(always)]
    fn claim(&mut self) {
        debug_assert!(self.is_free_leaf(), "Claimed a split or taken region.");
        self.body = Body::Leaf { allocated: true };
    }

    /// Split this node along the X axis. The bottom child ends just
    /// before the `y` row.
    ///
    /// ```text
    ///        +-----------+
    ///        |           |
    ///     ---+-----------+---
    ///        |           |
    ///        +-----------+
    /// ```
    ///
    /// Must be called on a free leaf, with `y` strictly inside the
    /// region's vertical extent. Anything else is a caller bug.
    pub fn hsplit(&mut self, y: GridSteps) {
        assert!(self.is_free_leaf(), "Split an allocated or divided region.");
        assert!(self.y < y && y < self.y + self.height, "Split row out of range.");
        self.body = Body::Split(Box::new((
            Region::new(self.x, self.y, self.width, y - self.y),
            Region::new(self.x, y, self.width, self.height - (y - self.y)),
        )));
    }

    /// Split this node along the Y axis. The left child ends just
    /// before the `x` column.
    ///
    /// ```text
    ///           |
    ///     +-----+-----+
    ///     |     |     |
    ///     |     |     |
    ///     +-----+-----+
    ///           |
    /// ```
    ///
    /// Must be called on a free leaf, with `x` strictly inside the
    /// region's horizontal extent.
    pub fn vsplit(&mut self, x: GridSteps) {
        assert!(self.is_free_leaf(), "Split an allocated or divided region.");
        assert!(self.x < x && x < self.x + self.width, "Split column out of range.");
        self.body = Body::Split(Box::new((
            Region::new(self.x, self.y, x - self.x, self.height),
            Region::new(x, self.y, self.width - (x - self.x), self.height),
        )));
    }

    // Enumerates the (up to four) corners of this leaf at which a
    // `width * height` rectangle fits, x-major, skipping duplicates,
    // and returns the first one the filter accepts.
    fn find_acceptable(
        &self,
        width: GridSteps,
        height: GridSteps,
        filter: Option<CandidateFilter<'_>>,
    ) -> Option<(GridSteps, GridSteps)> {
        iproduct!(
            [self.x, self.x + self.width - width],
            [self.y, self.y + self.height - height]
        )
        .unique()
        .find(|&(x, y)| match filter {
            Some(f) => f(x, y, width, height),
            None => true,
        })
    }

    /// Attempt to allocate a rectangular region of a specified size.
    ///
    /// The tree looks for a free leaf with enough room, trying smaller
    /// subdivisions before larger ones, and anchors the allocation at
    /// one of the leaf's corners -- whichever the `filter` accepts
    /// first. Corner placement keeps the remaining free space as large
    /// and contiguous as possible; so does slicing the leaf along the
    /// axis with the bigger leftover.
    ///
    /// On success, returns the bottom-left corner of the new
    /// allocation, to be handed back to [`free`](Region::free) later.
    /// On failure -- nothing fits, or the filter rejected every
    /// candidate -- returns `None` and leaves the tree untouched.
    ///
    /// A filter of `None` accepts every size-valid candidate. See
    /// [`CandidateFilter`] for the contract; a filter may, for
    /// example, check that the suggested region is fully connected or
    /// does not have too many faults.
    ///
    /// Panics if `width` or `height` is zero. Requests larger than the
    /// region are a normal failure, zero-sized ones are a caller bug.
    pub fn alloc(
        &mut self,
        width: GridSteps,
        height: GridSteps,
        filter: Option<CandidateFilter<'_>>,
    ) -> Option<(GridSteps, GridSteps)> {
        assert!(width >= 1 && height >= 1, "Zero-sized allocation requested.");

        // Already populated, or simply can't fit: fail fast.
        if self.is_allocated() || width > self.width || height > self.height {
            return None;
        }

        // Divided already: try inserting into the children, smallest
        // child first for tighter fits.
        if let Some((a, b)) = self.children_mut() {
            let (first, second) = if a.area() <= b.area() { (a, b) } else { (b, a) };
            return first
                .alloc(width, height, filter)
                .or_else(|| second.alloc(width, height, filter));
        }

        // An empty leaf with enough room. Find a corner acceptable to
        // the caller.
        let (x, y) = self.find_acceptable(width, height, filter)?;

        // If the region fits exactly, the leaf itself becomes the
        // allocation.
        if width == self.width && height == self.height {
            debug_assert!(x == self.x && y == self.y);
            self.claim();
            return Some((self.x, self.y));
        }

        // It does not fit exactly: slice this region up, along the
        // axis which preserves the largest free space.
        let dw = self.width - width;
        let dh = self.height - height;
        let child = if dh > dw {
            self.hsplit(if y != self.y { y } else { y + height });
            let (bottom, top) = self.children_mut().unwrap();
            if y == bottom.y { bottom } else { top }
        } else {
            self.vsplit(if x != self.x { x } else { x + width });
            let (left, right) = self.children_mut().unwrap();
            if x == left.x { left } else { right }
        };

        // If the child region is not exactly the right size either,
        // slice it one last time. Done explicitly rather than
        // recursively so the candidate filter is not consulted again.
        if child.width != width {
            child.vsplit(if x != child.x { x } else { child.x + width });
            let (left, right) = child.children_mut().unwrap();
            let grandchild = if x == left.x { left } else { right };
            grandchild.claim();
            return Some((grandchild.x, grandchild.y));
        } else if child.height != height {
            child.hsplit(if y != child.y { y } else { child.y + height });
            let (bottom, top) = child.children_mut().unwrap();
            let grandchild = if y == bottom.y { bottom } else { top };
            grandchild.claim();
            return Some((grandchild.x, grandchild.y));
        }
        child.claim();
        Some((child.x, child.y))
    }

    /// Attempt to allocate a region with at least the specified area
    /// which is "at least as square" as the specified aspect ratio.
    ///
    /// `min_ratio` bounds `min(w, h) / max(w, h)` from below; `0.0`
    /// allows any shape, `1.0` demands a square. The concrete shape is
    /// worked out by [`area_to_rect`](crate::sizing::area_to_rect) per
    /// leaf and then allocated like a fixed-size request.
    ///
    /// On success, returns the bottom-left corner *and* the chosen
    /// dimensions. On failure, returns `None` and the tree is left
    /// unchanged.
    ///
    /// Panics if `area` is zero.
    pub fn alloc_area(
        &mut self,
        area: GridSteps,
        min_ratio: f64,
        filter: Option<CandidateFilter<'_>>,
    ) -> Option<(GridSteps, GridSteps, GridSteps, GridSteps)> {
        assert!(area >= 1, "Zero-area allocation requested.");

        if self.is_allocated() || area > self.area() {
            return None;
        }

        if let Some((a, b)) = self.children_mut() {
            let (first, second) = if a.area() <= b.area() { (a, b) } else { (b, a) };
            return first
                .alloc_area(area, min_ratio, filter)
                .or_else(|| second.alloc_area(area, min_ratio, filter));
        }

        // A leaf: work out a suitable concrete size, if one exists,
        // and try allocating it.
        let (width, height) = area_to_rect(area, self.width, self.height, min_ratio)?;
        let (x, y) = self.alloc(width, height, filter)?;
        Some((x, y, width, height))
    }

    /// Request the allocation of a specific 1x1 block.
    ///
    /// May be useful when, e.g., one particular cell is wanted for
    /// testing. Returns the coordinates passed in on success, `None`
    /// if the cell is outside the region or already taken.
    pub fn request(&mut self, x: GridSteps, y: GridSteps) -> Option<(GridSteps, GridSteps)> {
        // Is the requested location in this region? If not, there's
        // nothing we can do.
        if !self.contains(x, y) {
            return None;
        }

        // Not a leaf: exactly one child contains the location.
        if let Some((a, b)) = self.children_mut() {
            return a.request(x, y).or_else(|| b.request(x, y));
        }

        if self.is_allocated() {
            return None;
        }

        // A 1x1 leaf just allocates itself.
        if self.width == 1 && self.height == 1 {
            self.claim();
            return Some((self.x, self.y));
        }

        // The point is somewhere in a larger leaf, which must be
        // divided until a 1x1 piece can be cut out. Split off the side
        // with the greatest amount of space first, so that the
        // residual region stays as large and contiguous as possible:
        //
        //     +---------------+
        //     |         a     |
        //     |<---l--->#<-r->|
        //     |         ^     |
        //     |         b     |
        //     |         v     |
        //     +---------------+
        let l = x - self.x;
        let r = (self.x + self.width) - x - 1;
        let a = (self.y + self.height) - y - 1;
        let b = y - self.y;
        let largest = l.max(r).max(a).max(b);

        if l == largest {
            self.vsplit(x);
        } else if r == largest {
            self.vsplit(x + 1);
        } else if a == largest {
            self.hsplit(y + 1);
        } else {
            // b == largest
            self.hsplit(y);
        }
        self.request(x, y)
    }

    /// Free a previous allocation, allowing the space to be reused.
    ///
    /// `(x, y)` must be the bottom-left corner some allocation was
    /// returned with. On the way back out, any split node whose two
    /// children are now free leaves collapses back into one, so the
    /// tree never accumulates stale subdivisions.
    pub fn free(&mut self, x: GridSteps, y: GridSteps) -> Result<(), FreeError> {
        let merge = match &mut self.body {
            // The region to be freed is this one (but only if it is a
            // leaf!).
            Body::Leaf { allocated } if self.x == x && self.y == y => {
                if !*allocated {
                    return Err(FreeError::NotAllocated(x, y));
                }
                *allocated = false;
                false
            }
            Body::Split(pair) => {
                let (a, b) = &mut **pair;
                if a.contains(x, y) {
                    a.free(x, y)?;
                } else if b.contains(x, y) {
                    b.free(x, y)?;
                } else {
                    return Err(FreeError::Outside(x, y));
                }
                pair.0.is_free_leaf() && pair.1.is_free_leaf()
            }
            // A leaf which does not own that corner: crash out.
            Body::Leaf { .. } => return Err(FreeError::Outside(x, y)),
        };
        if merge {
            self.body = Body::Leaf { allocated: false };
        }
        Ok(())
    }
}
