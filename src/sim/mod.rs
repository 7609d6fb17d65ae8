//! Gameplay simulation module
//!
//! Everything that decides what a collision means lives here. This module
//! never integrates physics itself:
//! - The engine is reached through `PhysicsWorld`
//! - Seeded RNG only, injected by the caller
//! - Deferred work is tagged and validated when it fires

pub mod board;
pub mod classify;
pub mod deflect;
pub mod game;
pub mod scoring;
pub mod stacking;
pub mod state;
pub mod timers;
pub mod world;

pub use board::{Board, Bucket, Peg, Rect, SpringWall};
pub use classify::{BodyLabel, Contact, DISK_LABEL, classify};
pub use deflect::peg_force;
pub use game::{Disk, Game};
pub use scoring::{BucketScore, score_bucket};
pub use stacking::stacking_forces;
pub use state::{BucketValues, GameEvent, RoundPhase, RoundState};
pub use timers::{Scheduler, Task};
pub use world::{BodyDesc, BodyHandle, BodySnapshot, CollisionPair, Material, PhysicsWorld, Shape, SpringDesc};
