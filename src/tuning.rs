//! Game balance and physics tuning
//!
//! Every gameplay constant lives here so a shell can override it from JSON.
//! Missing fields fall back to the defaults in `crate::consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Material applied to dropped disks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskMaterial {
    pub radius: f32,
    pub restitution: f32,
    pub friction: f32,
    pub friction_air: f32,
    pub density: f32,
}

impl Default for DiskMaterial {
    fn default() -> Self {
        Self {
            radius: DISK_RADIUS,
            restitution: 0.5,
            friction: 0.05,
            friction_air: 0.01,
            density: 0.002,
        }
    }
}

/// Game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Board ===
    pub board_width: f32,
    pub board_height: f32,
    pub peg_radius: f32,
    /// Height above the board where new disks spawn
    pub drop_y: f32,
    pub gravity: f32,
    pub disk: DiskMaterial,

    // === Round ===
    pub disks_per_round: u32,
    /// Bucket indices that carry a value each round
    pub gold_buckets: Vec<usize>,
    /// Inclusive range for gold bucket values
    pub bucket_value_min: u32,
    pub bucket_value_max: u32,

    // === Peg deflection ===
    /// Contact offset from a peg's centre line below which pegs push back
    pub peg_contact_threshold: f32,
    /// Horizontal kick applied at the apex peg
    pub apex_force: f32,
    /// Radial push applied at every other peg
    pub peg_force: f32,
    /// Width of the uniform jitter added to the radial push (per axis)
    pub peg_jitter: f32,

    // === Disk stacking ===
    pub stack_min_dy: f32,
    pub stack_max_dx: f32,
    /// Push on the upper disk; the lower disk gets half of it upward
    pub stack_force: f32,

    // === Deferred work ===
    pub removal_delay_ms: u64,
    pub grace_delay_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            peg_radius: PEG_RADIUS,
            drop_y: DISK_DROP_Y,
            gravity: GRAVITY,
            disk: DiskMaterial::default(),

            disks_per_round: DISKS_PER_ROUND,
            gold_buckets: GOLD_BUCKETS.to_vec(),
            bucket_value_min: 1000,
            bucket_value_max: 10_000,

            peg_contact_threshold: 2.0,
            apex_force: 0.002,
            peg_force: 0.0005,
            peg_jitter: 0.0001,

            stack_min_dy: 10.0,
            stack_max_dx: 5.0,
            stack_force: 0.001,

            removal_delay_ms: DISK_REMOVAL_DELAY_MS,
            grace_delay_ms: ROUND_GRACE_DELAY_MS,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON, filling any missing field from the defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values that would otherwise break round invariants
    fn sanitize(&mut self) {
        self.gold_buckets.retain(|&i| i < BUCKET_COUNT);
        self.gold_buckets.sort_unstable();
        self.gold_buckets.dedup();
        if self.bucket_value_min > self.bucket_value_max {
            log::warn!(
                "bucket value range {}..={} is inverted, swapping",
                self.bucket_value_min,
                self.bucket_value_max
            );
            std::mem::swap(&mut self.bucket_value_min, &mut self.bucket_value_max);
        }
        if self.disks_per_round == 0 {
            log::warn!("disks_per_round must be at least 1, using 1");
            self.disks_per_round = 1;
        }
        if self.board_width <= 0.0 || self.board_height <= 0.0 {
            log::warn!("non-positive board size, using defaults");
            self.board_width = BOARD_WIDTH;
            self.board_height = BOARD_HEIGHT;
        }
    }
}
