//! Plinko - collision-driven scoring core
//!
//! Core modules:
//! - `sim`: Round state, collision classification and gameplay handlers
//! - `physics`: rapier2d world implementing the engine contract
//! - `platform`: Browser bindings
//! - `tuning`: Data-driven game balance
//! - `highscores` / `review`: Validated payloads handed to the outer shell

pub mod highscores;
pub mod physics;
pub mod platform;
pub mod review;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScores, Initials};
pub use review::Review;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;

    /// Board dimensions
    pub const BOARD_WIDTH: f32 = 600.0;
    pub const BOARD_HEIGHT: f32 = 700.0;
    pub const WALL_THICKNESS: f32 = 20.0;

    /// Peg grid
    pub const PEG_RADIUS: f32 = 6.0;
    pub const PEG_ROWS: usize = 9;
    pub const PEG_COLS: usize = 11;
    pub const PEG_SPACING_Y: f32 = 50.0;
    pub const PEG_START_Y: f32 = 150.0;

    /// Buckets sit on the floor, dividers poke up between them
    pub const BUCKET_COUNT: usize = 9;
    pub const BUCKET_HEIGHT: f32 = 40.0;
    pub const DIVIDER_WIDTH: f32 = 5.0;
    pub const DIVIDER_HEIGHT: f32 = 40.0;
    pub const GOLD_BUCKETS: [usize; 3] = [1, 4, 7];

    /// Side wall suspension
    pub const SPRING_STIFFNESS: f32 = 0.1;
    pub const SPRING_DAMPING: f32 = 0.1;

    /// Disk defaults
    pub const DISK_RADIUS: f32 = 15.0;
    pub const DISK_DROP_Y: f32 = 50.0;
    pub const DISKS_PER_ROUND: u32 = 10;

    /// Downward gravity (engine units, scaled by 0.001 per ms²)
    pub const GRAVITY: f32 = 0.5;

    /// Deferred work
    pub const DISK_REMOVAL_DELAY_MS: u64 = 500;
    pub const ROUND_GRACE_DELAY_MS: u64 = 5000;
}
