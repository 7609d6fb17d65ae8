//! Rapier-backed physics world
//!
//! Implements `PhysicsWorld` on top of `rapier2d` so the game runs headless
//! and in the browser on the same engine:
//! - Pixels for lengths, the contract's milliseconds converted to seconds
//! - Circles and cuboids, walls hang from spring joints
//! - Collision-start events only, with the first solver contact as support
//! - Rectangles never collide with each other

use std::collections::BTreeMap;
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use crate::sim::world::{
    BodyDesc, BodyHandle, BodySnapshot, CollisionPair, PhysicsWorld, Shape, SpringDesc,
};

/// Largest slice of time integrated in one go
pub const SUBSTEP_MS: f32 = 1000.0 / 60.0;
/// Maximum substeps per step to prevent spiral of death
pub const MAX_SUBSTEPS: u32 = 8;
/// Reference step the air friction and spring coefficients are expressed against
const BASE_STEP_S: f32 = 1.0 / 60.0;
/// Gravity is given in engine units of 0.001 px/ms²
const GRAVITY_SCALE: f32 = 0.001;
/// Forces arrive in mass·px/ms², rapier integrates in seconds
const FORCE_SCALE: f32 = 1.0e6;
/// Typical object size, tunes rapier's tolerances for pixel coordinates
const LENGTH_UNIT: f32 = 30.0;

const CIRCLES: Group = Group::GROUP_1;
const RECTS: Group = Group::GROUP_2;

fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn to_point(v: Vec2) -> Point<Real> {
    point![v.x, v.y]
}

fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn area(shape: &Shape) -> f32 {
    match *shape {
        Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
        Shape::Rect { half_extents } => 4.0 * half_extents.x * half_extents.y,
    }
}

/// Per-step fraction of velocity kept by air friction, as a rapier damping rate
fn damping_rate(friction_air: f32) -> f32 {
    let kept = (1.0 - friction_air).max(f32::EPSILON);
    (1.0 - kept) / kept / BASE_STEP_S
}

#[derive(Debug, Clone)]
struct Entry {
    body: RigidBodyHandle,
    label: String,
    mass: f32,
    /// Fixed bodies holding this body's springs
    anchors: Vec<RigidBodyHandle>,
}

/// Collision start as seen by the narrow phase
#[derive(Debug, Clone, Copy)]
struct Started {
    collider1: ColliderHandle,
    collider2: ColliderHandle,
    support: Option<Vec2>,
}

/// First contact point of a pair, in world space
fn support_point(colliders: &ColliderSet, pair: &ContactPair) -> Option<Vec2> {
    let manifold = pair.manifolds.iter().find(|m| !m.points.is_empty())?;
    if let Some(contact) = manifold.data.solver_contacts.first() {
        return Some(Vec2::new(contact.point.x, contact.point.y));
    }
    let collider = colliders.get(pair.collider1)?;
    let world = collider.position() * manifold.points[0].local_p1;
    Some(Vec2::new(world.x, world.y))
}

#[derive(Default)]
struct StartCollector {
    started: Mutex<Vec<Started>>,
}

impl StartCollector {
    fn drain(&mut self) -> Vec<Started> {
        let started = self
            .started
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(started)
    }
}

impl EventHandler for StartCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        let CollisionEvent::Started(collider1, collider2, _) = event else {
            return;
        };
        let support = contact_pair.and_then(|pair| support_point(colliders, pair));
        let mut started = self
            .started
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        started.push(Started {
            collider1,
            collider2,
            support,
        });
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// The rapier world. Body handles are issued in increasing order and kept
/// in collider user data.
pub struct RapierWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    collector: StartCollector,
    entries: BTreeMap<BodyHandle, Entry>,
    /// Bodies with forces waiting for the next substep
    forced: Vec<RigidBodyHandle>,
    next_handle: u64,
}

impl RapierWorld {
    /// World with downward gravity in engine units (0.5 is the board default)
    pub fn new(gravity: f32) -> Self {
        let mut params = IntegrationParameters::default();
        params.length_unit = LENGTH_UNIT;
        Self {
            gravity: vector![0.0, gravity * GRAVITY_SCALE * FORCE_SCALE],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            collector: StartCollector::default(),
            entries: BTreeMap::new(),
            forced: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn body_count(&self) -> usize {
        self.entries.len()
    }

    /// Linear velocity in px/ms
    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        let entry = self.entries.get(&handle)?;
        let body = self.bodies.get(entry.body)?;
        Some(to_vec2(body.linvel()) / 1000.0)
    }

    fn handle_of(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        let collider = self.colliders.get(collider)?;
        u64::try_from(collider.user_data).ok().map(BodyHandle)
    }

    fn snapshot(&self, collider: ColliderHandle) -> Option<BodySnapshot> {
        let handle = self.handle_of(collider)?;
        let entry = self.entries.get(&handle)?;
        let body = self.bodies.get(entry.body)?;
        Some(BodySnapshot {
            handle,
            label: entry.label.clone(),
            position: to_vec2(body.translation()),
        })
    }

    fn substep(&mut self, dt_s: f32, pairs: &mut Vec<CollisionPair>) {
        self.params.dt = dt_s;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.collector,
        );

        // Forces last for one substep
        for handle in self.forced.drain(..) {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.reset_forces(false);
                body.reset_torques(false);
            }
        }

        for started in self.collector.drain() {
            let (Some(a), Some(b)) = (
                self.snapshot(started.collider1),
                self.snapshot(started.collider2),
            ) else {
                continue;
            };
            let support = started
                .support
                .unwrap_or_else(|| (a.position + b.position) / 2.0);
            pairs.push(CollisionPair { a, b, support });
        }
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        self.next_handle += 1;
        let handle = BodyHandle(self.next_handle);
        let material = desc.material;

        let builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            let damping = damping_rate(material.friction_air);
            RigidBodyBuilder::dynamic()
                .linear_damping(damping)
                .angular_damping(damping)
        };
        let mut builder = builder.translation(to_vector(desc.position));

        let collider = match desc.shape {
            Shape::Circle { radius } => {
                ColliderBuilder::ball(radius).collision_groups(InteractionGroups::new(CIRCLES, Group::ALL))
            }
            Shape::Rect { half_extents } => {
                // Suspended walls must not catch on the floor pieces they overlap
                builder = builder.lock_rotations();
                let filter = if desc.is_static { Group::ALL } else { CIRCLES };
                ColliderBuilder::cuboid(half_extents.x, half_extents.y)
                    .collision_groups(InteractionGroups::new(RECTS, filter))
            }
        }
        .density(material.density)
        .restitution(material.restitution)
        .restitution_combine_rule(CoefficientCombineRule::Max)
        .friction(material.friction)
        .friction_combine_rule(CoefficientCombineRule::Min)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .user_data(u128::from(handle.0))
        .build();

        let body = self.bodies.insert(builder.build());
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.entries.insert(
            handle,
            Entry {
                body,
                label: desc.label,
                mass: material.density * area(&desc.shape),
                anchors: Vec::new(),
            },
        );
        handle
    }

    fn add_spring(&mut self, spring: SpringDesc) {
        let Some(entry) = self.entries.get(&spring.body) else {
            log::warn!("Spring attached to unknown body {:?}", spring.body);
            return;
        };
        let Some(body) = self.bodies.get(entry.body) else {
            return;
        };
        let target = entry.body;
        let mass = entry.mass;
        let rest_length = spring
            .anchor
            .distance(to_vec2(body.translation()) + spring.local_point);

        // Coefficients are fractions of the body's mass per reference step
        let stiffness = spring.stiffness * mass / (BASE_STEP_S * BASE_STEP_S);
        let damping = spring.damping * mass / BASE_STEP_S;

        let anchor = self
            .bodies
            .insert(RigidBodyBuilder::fixed().translation(to_vector(spring.anchor)));
        let joint = SpringJointBuilder::new(rest_length, stiffness, damping)
            .spring_model(MotorModel::ForceBased)
            .local_anchor1(point![0.0, 0.0])
            .local_anchor2(to_point(spring.local_point))
            .build();
        self.impulse_joints.insert(anchor, target, joint, true);

        if let Some(entry) = self.entries.get_mut(&spring.body) {
            entry.anchors.push(anchor);
        }
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(entry) = self.entries.remove(&handle) else {
            return false;
        };
        for body in entry.anchors.into_iter().chain(std::iter::once(entry.body)) {
            self.bodies.remove(
                body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        self.forced.retain(|&b| b != entry.body);
        true
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        let entry = self.entries.get(&handle)?;
        self.bodies.get(entry.body).map(|b| to_vec2(b.translation()))
    }

    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2) {
        let Some(entry) = self.entries.get(&handle) else {
            return;
        };
        let Some(body) = self.bodies.get_mut(entry.body) else {
            return;
        };
        if !body.is_dynamic() {
            return;
        }
        body.add_force_at_point(to_vector(force * FORCE_SCALE), to_point(point), true);
        self.forced.push(entry.body);
    }

    fn bodies_labelled(&self, label: &str) -> Vec<BodyHandle> {
        self.entries
            .iter()
            .filter(|(_, e)| e.label == label)
            .map(|(h, _)| *h)
            .collect()
    }

    fn step(&mut self, dt_ms: f32) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();
        if dt_ms <= 0.0 {
            return pairs;
        }
        let substeps = ((dt_ms / SUBSTEP_MS).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let dt_s = dt_ms / substeps as f32 / 1000.0;
        for _ in 0..substeps {
            self.substep(dt_s, &mut pairs);
        }
        pairs
    }
}
