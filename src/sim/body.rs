//! Spatial primitive shared by every actor
//!
//! A body owns a display rectangle, a hitbox that follows it, a compass
//! heading and a fractional movement accumulator. Headings below one pixel
//! per tick are integrated until a whole pixel is owed, so a compass of
//! (0.3, 0) steps one pixel roughly every 3.3 ticks.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::collision::{self, CollisionReport};
use super::rect::Rect;

/// Facing label derived from the compass (drives animation rows upstream)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }

    /// Classify a compass. Headings within 0.25 of an axis snap to it;
    /// anything else falls back to the sign of x.
    pub fn from_compass(compass: Vec2) -> Self {
        let mut facing = if compass.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };
        let near_x_axis = compass.y.abs() < 0.25;
        let near_y_axis = compass.x.abs() < 0.25;
        if compass.x > 0.0 && near_x_axis {
            facing = Facing::Right;
        }
        if compass.x < 0.0 && near_x_axis {
            facing = Facing::Left;
        }
        if compass.y > 0.0 && near_y_axis {
            facing = Facing::Down;
        }
        if compass.y < 0.0 && near_y_axis {
            facing = Facing::Up;
        }
        facing
    }
}

/// Display rect + hitbox + heading for one actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Visual footprint
    pub rect: Rect,
    /// Collision footprint; its center tracks `rect.center() + hitbox_offset`
    pub hitbox: Rect,
    /// Desired direction per axis, nominally within [-1, 1]
    pub compass: Vec2,
    /// Current facing label
    pub facing: Facing,
    /// Fractional movement owed per axis
    tracker: Vec2,
    /// Hitbox anchor relative to the display center
    hitbox_offset: IVec2,
}

impl Body {
    /// Body whose top-left corner is at `pos`; the hitbox is the display rect
    /// inflated by `hitbox_inflate` (negative values shrink it).
    pub fn new(pos: IVec2, size: IVec2, hitbox_inflate: IVec2) -> Self {
        let rect = Rect::at(pos, size);
        Self {
            rect,
            hitbox: rect.inflate(hitbox_inflate.x, hitbox_inflate.y),
            compass: Vec2::new(1.0, 0.0),
            facing: Facing::Right,
            tracker: Vec2::ZERO,
            hitbox_offset: IVec2::ZERO,
        }
    }

    /// Anchor the hitbox off-center (the player's box sits one pixel right)
    pub fn with_hitbox_offset(mut self, offset: IVec2) -> Self {
        self.hitbox_offset = offset;
        self.sync_hitbox();
        self
    }

    #[inline]
    pub fn center(&self) -> IVec2 {
        self.rect.center()
    }

    /// Pending sub-pixel movement
    #[inline]
    pub fn tracker(&self) -> Vec2 {
        self.tracker
    }

    /// Integrate the compass and take whole-pixel steps once owed.
    ///
    /// The compass is clamped to unit length first so diagonal headings are
    /// not faster than axis-aligned ones. Each axis fires at most one step
    /// of `speed` pixels per call; both may fire in the same tick.
    pub fn step(&mut self, speed: i32) {
        self.tracker += self.compass.clamp_length_max(1.0);

        if self.tracker.y <= -1.0 {
            self.move_up(speed);
            self.tracker.y += 1.0;
        } else if self.tracker.y >= 1.0 {
            self.move_down(speed);
            self.tracker.y -= 1.0;
        }

        if self.tracker.x <= -1.0 {
            self.move_left(speed);
            self.tracker.x += 1.0;
        } else if self.tracker.x >= 1.0 {
            self.move_right(speed);
            self.tracker.x -= 1.0;
        }
    }

    pub fn move_left(&mut self, speed: i32) {
        self.translate(IVec2::new(-speed, 0));
    }

    pub fn move_right(&mut self, speed: i32) {
        self.translate(IVec2::new(speed, 0));
    }

    pub fn move_up(&mut self, speed: i32) {
        self.translate(IVec2::new(0, -speed));
    }

    pub fn move_down(&mut self, speed: i32) {
        self.translate(IVec2::new(0, speed));
    }

    /// Greedy axis-independent step toward `goal` (a top-left corner).
    /// Never overshoots.
    pub fn step_towards(&mut self, goal: IVec2, speed: i32) {
        let delta = goal - self.rect.top_left();
        if delta.x != 0 {
            let amount = speed.min(delta.x.abs());
            if delta.x > 0 {
                self.move_right(amount);
            } else {
                self.move_left(amount);
            }
        }
        if delta.y != 0 {
            let amount = speed.min(delta.y.abs());
            if delta.y > 0 {
                self.move_down(amount);
            } else {
                self.move_up(amount);
            }
        }
    }

    /// Point the compass at `target` (unit length)
    pub fn face_towards(&mut self, target: IVec2) {
        self.compass = crate::heading_towards(self.center(), target);
    }

    /// Re-derive the facing label from the compass
    pub fn update_facing(&mut self) {
        self.facing = Facing::from_compass(self.compass);
    }

    /// Is `other` (some actor's body) facing toward this body?
    pub fn is_faced_by(&self, other: &Body) -> bool {
        let delta_x = (self.rect.x - other.rect.x).abs();
        let delta_y = (self.rect.y - other.rect.y).abs();

        if delta_x >= delta_y {
            if self.rect.x < other.rect.x {
                other.facing == Facing::Left
            } else {
                other.facing == Facing::Right
            }
        } else if self.rect.y < other.rect.y {
            other.facing == Facing::Up
        } else {
            other.facing == Facing::Down
        }
    }

    fn translate(&mut self, delta: IVec2) {
        self.rect.translate(delta);
        self.sync_hitbox();
    }

    fn sync_hitbox(&mut self) {
        self.hitbox.set_center(self.rect.center() + self.hitbox_offset);
    }
}

/// Anything with a body that bumps into obstacles
pub trait Movable {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Scan `obstacles`, push the body out of every overlap and bounce the
    /// compass off the side that was hit. Returns the scan for callers that
    /// react to contact (charge impact, patrol timer reset).
    fn collision_handler(&mut self, obstacles: &[Rect], escape_speed: i32) -> CollisionReport {
        let body = self.body_mut();
        let report = collision::detect(body, obstacles);
        if report.detected() {
            collision::settle(body, &report, obstacles, escape_speed);
            collision::reflect_compass(body, &report);
        }
        report
    }
}
