//! Game loop glue
//!
//! Owns the round, the timers and the physics world, and routes every
//! collision pair through the classifier to the matching handler. All work
//! runs synchronously inside `tick`/`handle_collisions`; the only deferred
//! work is the timer queue, validated when it fires.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::board::Board;
use super::classify::{Contact, DISK_LABEL, classify};
use super::deflect::peg_force;
use super::scoring::score_bucket;
use super::stacking::stacking_forces;
use super::state::{BucketValues, GameEvent, RoundPhase, RoundState};
use super::timers::{Scheduler, Task};
use super::world::{BodyDesc, BodyHandle, CollisionPair, Material, PhysicsWorld};
use crate::Tuning;
use crate::review::{Review, ReviewError};

/// A disk the game dropped this round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disk {
    pub handle: BodyHandle,
    pub column: usize,
    pub created_at_ms: u64,
}

pub struct Game<W: PhysicsWorld, R: Rng = Pcg32> {
    world: W,
    board: Board,
    tuning: Tuning,
    rng: R,
    round: RoundState,
    timers: Scheduler,
    disks: Vec<Disk>,
    events: Vec<GameEvent>,
    /// Sub-millisecond time carried between ticks
    clock_remainder_ms: f32,
}

impl<W: PhysicsWorld> Game<W, Pcg32> {
    /// Game with a reproducible RNG
    pub fn with_seed(world: W, tuning: Tuning, seed: u64) -> Self {
        Self::new(world, tuning, Pcg32::seed_from_u64(seed))
    }
}

impl<W: PhysicsWorld, R: Rng> Game<W, R> {
    /// Build the board into `world` and wait in `Idle` for a start
    pub fn new(mut world: W, tuning: Tuning, rng: R) -> Self {
        let board = Board::from_tuning(&tuning);
        board.install(&mut world);
        Self {
            world,
            board,
            tuning,
            rng,
            round: RoundState::new(),
            timers: Scheduler::new(),
            disks: Vec::new(),
            events: Vec::new(),
            clock_remainder_ms: 0.0,
        }
    }

    pub fn score(&self) -> u64 {
        self.round.score
    }

    pub fn disks_remaining(&self) -> u32 {
        self.round.disks_remaining
    }

    pub fn is_active(&self) -> bool {
        self.round.is_active()
    }

    pub fn is_over(&self) -> bool {
        self.round.is_over()
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn bucket_values(&self) -> &BucketValues {
        &self.round.bucket_values
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Disks dropped this round that are still on the board
    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start (or restart) a round
    pub fn start_game(&mut self) {
        for handle in self.world.bodies_labelled(DISK_LABEL) {
            self.world.remove_body(handle);
        }
        self.disks.clear();

        self.round.begin(&self.tuning, &mut self.rng);
        log::info!(
            "Round {} started, bucket values {:?}",
            self.round.generation,
            self.round.bucket_values
        );
        self.events.push(GameEvent::RoundStarted {
            generation: self.round.generation,
            bucket_values: self.round.bucket_values,
        });
    }

    /// Drop column under a board x coordinate
    pub fn column_at(&self, x: f32) -> Option<usize> {
        self.board.column_at(x)
    }

    /// Drop a disk into a column. Out-of-turn requests are ignored.
    pub fn drop_disk(&mut self, column: usize) -> Option<BodyHandle> {
        if !self.round.can_drop() {
            log::debug!(
                "Ignoring drop in column {} ({:?}, {} disks left)",
                column,
                self.round.phase,
                self.round.disks_remaining
            );
            return None;
        }
        if column >= self.board.buckets.len() {
            log::debug!("Ignoring drop in unknown column {}", column);
            return None;
        }

        let disk = self.tuning.disk;
        let position = Vec2::new(self.board.column_center(column), self.tuning.drop_y);
        let handle = self.world.add_body(
            BodyDesc::circle(DISK_LABEL, position, disk.radius)
                .dynamic()
                .with_material(Material {
                    restitution: disk.restitution,
                    friction: disk.friction,
                    friction_air: disk.friction_air,
                    density: disk.density,
                }),
        );
        self.disks.push(Disk {
            handle,
            column,
            created_at_ms: self.timers.now_ms(),
        });

        let exhausted = self.round.take_disk();
        log::debug!(
            "Disk {:?} dropped in column {}, {} left",
            handle,
            column,
            self.round.disks_remaining
        );
        if exhausted {
            self.timers.schedule(
                self.tuning.grace_delay_ms,
                Task::EndRound {
                    generation: self.round.generation,
                },
            );
        }

        self.events.push(GameEvent::DiskDropped { disk: handle, column });
        Some(handle)
    }

    /// Drop a disk in the column under a board x coordinate
    pub fn drop_at(&mut self, x: f32) -> Option<BodyHandle> {
        let column = self.column_at(x)?;
        self.drop_disk(column)
    }

    /// React to one tick's worth of collision pairs
    pub fn handle_collisions(&mut self, pairs: &[CollisionPair]) {
        for pair in pairs {
            match classify(pair) {
                Some(Contact::DiskBucket { disk, bucket }) => {
                    self.on_bucket(disk.handle, bucket);
                }
                Some(Contact::DiskPeg { disk, peg, support }) => {
                    let apex = self.board.is_apex(peg.position);
                    if let Some(force) = peg_force(
                        disk.position,
                        peg.position,
                        support,
                        apex,
                        &self.tuning,
                        &mut self.rng,
                    ) {
                        log::trace!("Peg nudge {:?} on {:?} (apex: {})", force, disk.handle, apex);
                        self.world.apply_force(disk.handle, disk.position, force);
                        self.events.push(GameEvent::PegDeflected {
                            disk: disk.handle,
                            apex,
                        });
                    }
                }
                Some(Contact::DiskDisk { a, b }) => {
                    if let Some(forces) = stacking_forces(a, b, &self.tuning) {
                        for (handle, force) in forces {
                            let point = if handle == a.handle { a.position } else { b.position };
                            log::trace!("Unstack {:?} with {:?}", handle, force);
                            self.world.apply_force(handle, point, force);
                        }
                    }
                }
                None => {}
            }
        }
    }

    fn on_bucket(&mut self, disk: BodyHandle, bucket: Option<usize>) {
        // Already scored, waiting to be removed
        if self.timers.has_pending(&Task::RemoveDisk { disk }) {
            return;
        }
        let result = score_bucket(
            &mut self.round,
            &mut self.timers,
            self.tuning.removal_delay_ms,
            disk,
            bucket,
        );
        self.events.push(GameEvent::BucketScored {
            disk,
            bucket,
            points: result.points,
            score: result.score,
        });
    }

    /// Advance the game clock and run whatever timers came due
    pub fn advance_timers(&mut self, dt_ms: u64) {
        for task in self.timers.advance(dt_ms) {
            match task {
                Task::RemoveDisk { disk } => {
                    self.disks.retain(|d| d.handle != disk);
                    if self.world.remove_body(disk) {
                        self.events.push(GameEvent::DiskRemoved { disk });
                    }
                }
                Task::EndRound { generation } => {
                    if self.round.finish(generation) {
                        log::info!("Round {} over, score {}", generation, self.round.score);
                        self.events.push(GameEvent::RoundOver {
                            score: self.round.score,
                        });
                    } else {
                        log::debug!("Stale end-of-round timer for round {} ignored", generation);
                    }
                }
            }
        }
    }

    /// Step the world, react to its collisions, then run due timers
    pub fn tick(&mut self, dt_ms: f32) {
        let pairs = self.world.step(dt_ms);
        self.handle_collisions(&pairs);

        self.clock_remainder_ms += dt_ms.max(0.0);
        let whole = self.clock_remainder_ms.floor();
        self.clock_remainder_ms -= whole;
        self.advance_timers(whole as u64);
    }

    /// Queue a validated review for the shell to store
    pub fn submit_review(&mut self, review: Review) -> Result<(), ReviewError> {
        review.validate()?;
        log::info!("Review submitted: {} stars", review.rating);
        self.events.push(GameEvent::ReviewSubmitted(review));
        Ok(())
    }
}
