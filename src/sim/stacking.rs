//! Disk stacking correction
//!
//! Two disks resting almost exactly on top of each other can settle into a
//! column that never clears. When a contact looks like that, the upper disk
//! is pushed down and the lower one up at half strength so they slide apart.

use glam::Vec2;

use super::world::{BodyHandle, BodySnapshot};
use crate::Tuning;

/// Force pair for a near-vertical stack, as `(body, force)` entries
pub type ForcePair = [(BodyHandle, Vec2); 2];

pub fn stacking_forces(a: &BodySnapshot, b: &BodySnapshot, tuning: &Tuning) -> Option<ForcePair> {
    let dy = a.position.y - b.position.y;
    let dx = (a.position.x - b.position.x).abs();

    if dy.abs() <= tuning.stack_min_dy || dx >= tuning.stack_max_dx {
        return None;
    }

    // Screen coordinates: smaller y is higher up
    let (upper, lower) = if dy < 0.0 { (a, b) } else { (b, a) };
    Some([
        (upper.handle, Vec2::new(0.0, tuning.stack_force)),
        (lower.handle, Vec2::new(0.0, -tuning.stack_force * 0.5)),
    ])
}
