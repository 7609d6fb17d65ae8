//! Bucket scoring
//!
//! A disk landing in a bucket banks that bucket's value for the round and is
//! taken off the board shortly after, once the landing has had time to read.

use super::state::RoundState;
use super::timers::{Scheduler, Task};
use super::world::BodyHandle;

/// Outcome of one bucket contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketScore {
    pub points: u32,
    /// Round total after this contact
    pub score: u64,
}

/// Bank the bucket's value and schedule the disk's removal
pub fn score_bucket(
    round: &mut RoundState,
    timers: &mut Scheduler,
    removal_delay_ms: u64,
    disk: BodyHandle,
    bucket: Option<usize>,
) -> BucketScore {
    let points = round.bucket_value(bucket);
    let score = round.add_score(points);
    timers.schedule(removal_delay_ms, Task::RemoveDisk { disk });

    log::debug!("Disk {:?} scored {} in bucket {:?} (total {})", disk, points, bucket, score);
    BucketScore { points, score }
}
