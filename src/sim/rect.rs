//! Integer axis-aligned rectangles
//!
//! Pixel-space boxes used for display footprints, hitboxes and radar areas.
//! Edges that only touch do not count as overlapping.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size whose top-left corner sits at `pos`
    pub fn at(pos: IVec2, size: IVec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.w, self.h)
    }

    /// Center point (integer division, like most 2D sprite libraries)
    #[inline]
    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Move the rectangle so its center lands on `center`
    pub fn set_center(&mut self, center: IVec2) {
        self.x = center.x - self.w / 2;
        self.y = center.y - self.h / 2;
    }

    /// Translate in place
    #[inline]
    pub fn translate(&mut self, delta: IVec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Grow (or shrink, with negative amounts) around the current center
    pub fn inflate(&self, dw: i32, dh: i32) -> Self {
        let mut grown = Self::new(self.x, self.y, (self.w + dw).max(0), (self.h + dh).max(0));
        grown.set_center(self.center());
        grown
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Strict overlap test: shared edges are not a collision
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Horizontal overlap depth (<= 0 when the x-extents are disjoint or touching)
    #[inline]
    pub fn overlap_x(&self, other: &Rect) -> i32 {
        self.right().min(other.right()) - self.left().max(other.left())
    }

    /// Vertical overlap depth (<= 0 when the y-extents are disjoint or touching)
    #[inline]
    pub fn overlap_y(&self, other: &Rect) -> i32 {
        self.bottom().min(other.bottom()) - self.top().max(other.top())
    }
}
