//! Physics engine contract
//!
//! The core never integrates bodies itself. It describes what it needs from a
//! rigid-body engine through `PhysicsWorld` and consumes the collision pairs
//! the engine reports each step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque body identifier issued by a world.
///
/// Handles are never reused within one world, so a stale handle can only
/// ever refer to a body that is already gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Collision shape, centred on the body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

/// Surface and mass properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
    pub friction_air: f32,
    pub density: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.1,
            friction_air: 0.01,
            density: 0.001,
        }
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    /// Free-form label the engine hands back in collision pairs
    pub label: String,
    pub shape: Shape,
    pub position: Vec2,
    pub is_static: bool,
    pub material: Material,
}

impl BodyDesc {
    pub fn circle(label: impl Into<String>, position: Vec2, radius: f32) -> Self {
        Self {
            label: label.into(),
            shape: Shape::Circle { radius },
            position,
            is_static: true,
            material: Material::default(),
        }
    }

    pub fn rect(label: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            label: label.into(),
            shape: Shape::Rect {
                half_extents: size / 2.0,
            },
            position,
            is_static: true,
            material: Material::default(),
        }
    }

    pub fn dynamic(mut self) -> Self {
        self.is_static = false;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }
}

/// A spring from a fixed world anchor to a point on a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringDesc {
    pub anchor: Vec2,
    pub body: BodyHandle,
    /// Attachment point relative to the body centre
    pub local_point: Vec2,
    pub stiffness: f32,
    pub damping: f32,
}

/// Snapshot of one side of a collision pair
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    pub handle: BodyHandle,
    pub label: String,
    pub position: Vec2,
}

/// One collision-start notification for a pair of bodies
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPair {
    pub a: BodySnapshot,
    pub b: BodySnapshot,
    /// Representative contact point (first support of the pair)
    pub support: Vec2,
}

/// The rigid-body engine as seen by the game core
pub trait PhysicsWorld {
    /// Add a body and return its handle
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Suspend a body from a spring constraint
    fn add_spring(&mut self, spring: SpringDesc);

    /// Remove a body. Returns false if the body was already gone.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    fn contains(&self, handle: BodyHandle) -> bool;

    fn position(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Apply a force at a world point for the next step. Unknown handles are ignored.
    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2);

    /// All live bodies carrying the given label
    fn bodies_labelled(&self, label: &str) -> Vec<BodyHandle>;

    /// Advance the simulation and return the pairs that started touching
    fn step(&mut self, dt_ms: f32) -> Vec<CollisionPair>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording world for driving handlers without a simulation

    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug, Clone)]
    pub struct RecordedBody {
        pub desc: BodyDesc,
        pub position: Vec2,
    }

    #[derive(Debug, Default)]
    pub struct RecordingWorld {
        pub bodies: BTreeMap<BodyHandle, RecordedBody>,
        pub springs: Vec<SpringDesc>,
        pub forces: Vec<(BodyHandle, Vec2, Vec2)>,
        pub removals: Vec<BodyHandle>,
        /// Pairs returned by the next `step`
        pub pending_pairs: Vec<CollisionPair>,
        next_handle: u64,
    }

    impl RecordingWorld {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
            if let Some(body) = self.bodies.get_mut(&handle) {
                body.position = position;
            }
        }

        pub fn snapshot(&self, handle: BodyHandle) -> BodySnapshot {
            let body = &self.bodies[&handle];
            BodySnapshot {
                handle,
                label: body.desc.label.clone(),
                position: body.position,
            }
        }

        pub fn count_labelled(&self, label: &str) -> usize {
            self.bodies_labelled(label).len()
        }
    }

    impl PhysicsWorld for RecordingWorld {
        fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
            self.next_handle += 1;
            let handle = BodyHandle(self.next_handle);
            let position = desc.position;
            self.bodies.insert(handle, RecordedBody { desc, position });
            handle
        }

        fn add_spring(&mut self, spring: SpringDesc) {
            self.springs.push(spring);
        }

        fn remove_body(&mut self, handle: BodyHandle) -> bool {
            let existed = self.bodies.remove(&handle).is_some();
            if existed {
                self.removals.push(handle);
            }
            existed
        }

        fn contains(&self, handle: BodyHandle) -> bool {
            self.bodies.contains_key(&handle)
        }

        fn position(&self, handle: BodyHandle) -> Option<Vec2> {
            self.bodies.get(&handle).map(|b| b.position)
        }

        fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2) {
            if self.bodies.contains_key(&handle) {
                self.forces.push((handle, point, force));
            }
        }

        fn bodies_labelled(&self, label: &str) -> Vec<BodyHandle> {
            self.bodies
                .iter()
                .filter(|(_, b)| b.desc.label == label)
                .map(|(h, _)| *h)
                .collect()
        }

        fn step(&mut self, _dt_ms: f32) -> Vec<CollisionPair> {
            std::mem::take(&mut self.pending_pairs)
        }
    }
}
