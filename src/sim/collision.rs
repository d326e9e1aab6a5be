//! Collision detection and response for hitboxes on the tile grid
//!
//! Detection is a broad-phase overlap test against every candidate followed
//! by a "further axis" side classifier: whichever of |dx| and |dy| between
//! the two centers is larger decides whether the hit was horizontal or
//! vertical (ties count as vertical). Response pushes the body out one pixel
//! at a time along that axis and mirrors the compass across the struck side.

use glam::{IVec2, Vec2};

use super::body::Body;
use super::rect::Rect;

/// Axis along which a contact is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Side of the body that a contact sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Up,
    Down,
}

impl Side {
    pub fn axis(&self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::Horizontal,
            Side::Up | Side::Down => Axis::Vertical,
        }
    }
}

/// Which axis separates `from` and `to` the most (ties go vertical)
#[inline]
pub fn further_axis(from: IVec2, to: IVec2) -> Axis {
    let delta = (to - from).abs();
    if delta.x > delta.y {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Side of `from` on which `to` lies
pub fn side_of(from: IVec2, to: IVec2) -> Side {
    match further_axis(from, to) {
        Axis::Horizontal if to.x > from.x => Side::Right,
        Axis::Horizontal => Side::Left,
        Axis::Vertical if to.y > from.y => Side::Down,
        Axis::Vertical => Side::Up,
    }
}

/// One overlapping obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// The obstacle's hitbox
    pub obstacle: Rect,
    /// Where the obstacle sits relative to the body
    pub side: Side,
}

impl Contact {
    /// Contact coordinate (the obstacle's center)
    #[inline]
    pub fn point(&self) -> IVec2 {
        self.obstacle.center()
    }
}

/// Result of one collision scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Every overlapping obstacle in candidate order
    pub contacts: Vec<Contact>,
}

impl CollisionReport {
    pub fn miss() -> Self {
        Self::default()
    }

    #[inline]
    pub fn detected(&self) -> bool {
        !self.contacts.is_empty()
    }

    /// Contact points bucketed on one side
    pub fn points_on(&self, side: Side) -> Vec<IVec2> {
        self.contacts
            .iter()
            .filter(|c| c.side == side)
            .map(Contact::point)
            .collect()
    }

    /// Mean of all contact points, or the origin when nothing was hit
    pub fn average_point(&self) -> Vec2 {
        if self.contacts.is_empty() {
            return Vec2::ZERO;
        }
        let sum = self
            .contacts
            .iter()
            .fold(Vec2::ZERO, |acc, c| acc + c.point().as_vec2());
        sum / self.contacts.len() as f32
    }
}

/// Collect every obstacle overlapping the body's hitbox.
///
/// Pure: the body is not moved. O(n) in the number of candidates.
pub fn detect(body: &Body, obstacles: &[Rect]) -> CollisionReport {
    let center = body.hitbox.center();
    let contacts = obstacles
        .iter()
        .filter(|obstacle| body.hitbox.intersects(obstacle))
        .map(|&obstacle| Contact {
            obstacle,
            side: side_of(center, obstacle.center()),
        })
        .collect();
    CollisionReport { contacts }
}

/// Push the body out of one obstacle, one `speed`-pixel nudge at a time,
/// along the axis its side was classified on. Stops as soon as the boxes no
/// longer overlap; does nothing if they already don't (e.g. an earlier
/// contact already cleared this one).
pub fn eject_from(body: &mut Body, contact: &Contact, speed: i32) {
    let speed = speed.max(1);
    let obstacle = contact.obstacle;
    // bounded by the combined extent so a degenerate box can't spin forever
    let max_nudges = (body.hitbox.w + body.hitbox.h + obstacle.w + obstacle.h) / speed + 1;

    for _ in 0..max_nudges {
        if !body.hitbox.intersects(&obstacle) {
            break;
        }
        match contact.side {
            Side::Right => body.move_left(speed),
            Side::Left => body.move_right(speed),
            Side::Down => body.move_up(speed),
            Side::Up => body.move_down(speed),
        }
    }
}

/// Eject the body from every contact in the report
pub fn resolve_overlaps(body: &mut Body, report: &CollisionReport, speed: i32) {
    for contact in &report.contacts {
        eject_from(body, contact, speed);
    }
}

/// Upper bound on rescans in [`settle`]
pub const MAX_SETTLE_PASSES: usize = 4;

/// Resolve `report`, then rescan and resolve again while the nudges pushed
/// the body into an obstacle it was not touching (a corner made of two
/// boxes). Gives up after [`MAX_SETTLE_PASSES`] passes.
pub fn settle(body: &mut Body, report: &CollisionReport, obstacles: &[Rect], speed: i32) {
    resolve_overlaps(body, report, speed);
    for _ in 1..MAX_SETTLE_PASSES {
        let rescan = detect(body, obstacles);
        if !rescan.detected() {
            break;
        }
        resolve_overlaps(body, &rescan, speed);
    }
}

/// Reflect a vector across a surface normal: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce the compass off the side implied by the averaged contact point.
///
/// Only a heading that still points into the struck side is mirrored, so a
/// glancing contact does not flip the compass back and forth. Returns
/// whether the compass changed.
pub fn reflect_compass(body: &mut Body, report: &CollisionReport) -> bool {
    if !report.detected() {
        return false;
    }

    let center = body.center().as_vec2();
    let delta = report.average_point() - center;
    let compass = body.compass;

    let normal = if delta.x.abs() > delta.y.abs() {
        let heading_in = if delta.x > 0.0 {
            compass.x > 0.0
        } else {
            compass.x < 0.0
        };
        heading_in.then_some(Vec2::X)
    } else {
        let heading_in = if delta.y < 0.0 {
            compass.y < 0.0
        } else {
            compass.y > 0.0
        };
        heading_in.then_some(Vec2::Y)
    };

    match normal {
        Some(normal) => {
            body.compass = reflect_velocity(compass, normal);
            true
        }
        None => false,
    }
}
