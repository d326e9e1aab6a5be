//! Proximity sensor
//!
//! A radar is an enlarged rectangle kept centered on its owner. It only
//! answers "who is near"; it never takes part in collision response.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::actor::ActorId;
use super::rect::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Radar {
    pub rect: Rect,
}

impl Radar {
    /// Radar around `owner`, grown by `inflation` pixels in each dimension
    pub fn around(owner: &Rect, inflation: i32) -> Self {
        Self {
            rect: owner.inflate(inflation, inflation),
        }
    }

    /// Keep the radar on its owner (call before every scan)
    #[inline]
    pub fn recenter(&mut self, center: IVec2) {
        self.rect.set_center(center);
    }

    /// Single-target check (typically the player's hitbox)
    #[inline]
    pub fn sees(&self, hitbox: &Rect) -> bool {
        self.rect.intersects(hitbox)
    }

    /// Nearest candidate whose hitbox is on the radar.
    ///
    /// Distance is center to center from `origin`. Equal distances resolve
    /// to the lowest id so the answer never depends on container order.
    pub fn nearest<I>(&self, origin: IVec2, candidates: I) -> Option<ActorId>
    where
        I: IntoIterator<Item = (ActorId, Rect)>,
    {
        let origin = origin.as_vec2();
        candidates
            .into_iter()
            .filter(|(_, hitbox)| self.sees(hitbox))
            .map(|(id, hitbox)| (id, origin.distance(hitbox.center().as_vec2())))
            .min_by(|(id_a, dist_a), (id_b, dist_b)| {
                dist_a
                    .partial_cmp(dist_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(id_a.cmp(id_b))
            })
            .map(|(id, _)| id)
    }
}
