//! Peg deflection
//!
//! The engine already separates a disk from a peg it hits. On top of that,
//! head-on hits get a gameplay nudge: the apex peg kicks the disk left or
//! right at random, every other peg pushes it radially outward with a little
//! jitter so no two runs thread the same path.
//!
//! A contact point always sits on the peg surface, one radius from the
//! centre, so "near the centre" is measured across the peg's vertical centre
//! line: a disk landing on the crown of a peg qualifies, a glancing side hit
//! does not.

use glam::Vec2;
use rand::Rng;

use crate::Tuning;

/// Force to apply to the disk for one peg contact, if any.
///
/// `support` is the contact point reported by the engine; only contacts whose
/// support lies within `peg_contact_threshold` of the peg's centre line qualify.
pub fn peg_force<R: Rng>(
    disk_pos: Vec2,
    peg_pos: Vec2,
    support: Vec2,
    apex: bool,
    tuning: &Tuning,
    rng: &mut R,
) -> Option<Vec2> {
    let offset = centre_line_offset(support, peg_pos);
    if offset >= tuning.peg_contact_threshold {
        return None;
    }

    if apex {
        return Some(apex_kick(tuning.apex_force, rng));
    }

    let outward = (disk_pos - peg_pos).normalize_or_zero() * tuning.peg_force;
    Some(outward + jitter(tuning.peg_jitter, rng))
}

/// Horizontal distance from a contact point to the peg's vertical centre line
pub fn centre_line_offset(support: Vec2, peg_pos: Vec2) -> f32 {
    (support.x - peg_pos.x).abs()
}

/// Horizontal kick of fixed magnitude, side picked by coin flip
fn apex_kick<R: Rng>(magnitude: f32, rng: &mut R) -> Vec2 {
    let direction = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
    Vec2::new(direction * magnitude, 0.0)
}

/// Uniform jitter in [-width/2, width/2) on each axis
fn jitter<R: Rng>(width: f32, rng: &mut R) -> Vec2 {
    Vec2::new(
        (rng.random::<f32>() - 0.5) * width,
        (rng.random::<f32>() - 0.5) * width,
    )
}
