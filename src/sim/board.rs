//! Static board geometry
//!
//! Pegs in a staggered grid, nine buckets on the floor with dividers between
//! them, and two side walls hung from springs so they give a little when a
//! disk slams into them. Everything here is a pure function of the board size.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{BodyDesc, BodyHandle, Material, PhysicsWorld, SpringDesc};
use crate::Tuning;
use crate::consts::*;

pub const PEG_LABEL: &str = "peg";
pub const DIVIDER_LABEL: &str = "divider";
pub const WALL_LABEL: &str = "wall";
pub const BUCKET_LABEL_PREFIX: &str = "bucket-";

/// Pegs within this horizontal distance of the apex position count as the apex
const APEX_TOLERANCE_X: f32 = 5.0;
const APEX_TOLERANCE_Y: f32 = 0.5;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn min_x(&self) -> f32 {
        self.center.x - self.size.x / 2.0
    }

    pub fn max_x(&self) -> f32 {
        self.center.x + self.size.x / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub radius: f32,
    /// Horizontal centre of the top row
    pub apex: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub index: usize,
    pub rect: Rect,
    /// Gold buckets carry the round's randomized values
    pub gold: bool,
}

impl Bucket {
    pub fn label(&self) -> String {
        bucket_label(self.index)
    }
}

/// A side wall and the two springs it hangs from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringWall {
    pub rect: Rect,
    /// (world anchor, attachment point relative to the wall centre)
    pub springs: [(Vec2, Vec2); 2],
    pub stiffness: f32,
    pub damping: f32,
}

pub fn bucket_label(index: usize) -> String {
    format!("{BUCKET_LABEL_PREFIX}{index}")
}

/// Immutable board layout for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f32,
    pub height: f32,
    pub pegs: Vec<Peg>,
    pub buckets: Vec<Bucket>,
    pub dividers: Vec<Rect>,
    pub walls: [SpringWall; 2],
}

impl Board {
    pub fn new(width: f32, height: f32, peg_radius: f32) -> Self {
        Self {
            width,
            height,
            pegs: layout_pegs(width, peg_radius),
            buckets: layout_buckets(width, height),
            dividers: layout_dividers(width, height),
            walls: [
                spring_wall(-WALL_THICKNESS / 2.0, height),
                spring_wall(width + WALL_THICKNESS / 2.0, height),
            ],
        }
    }

    /// Board sized by the tuning, with gold flags following its gold buckets
    pub fn from_tuning(tuning: &Tuning) -> Self {
        let mut board = Self::new(tuning.board_width, tuning.board_height, tuning.peg_radius);
        for bucket in &mut board.buckets {
            bucket.gold = tuning.gold_buckets.contains(&bucket.index);
        }
        board
    }

    pub fn apex_peg(&self) -> Option<&Peg> {
        self.pegs.iter().find(|p| p.apex)
    }

    /// Whether a peg centred at `pos` is the apex peg
    pub fn is_apex(&self, pos: Vec2) -> bool {
        self.apex_peg().is_some_and(|apex| {
            (pos.y - apex.pos.y).abs() < APEX_TOLERANCE_Y
                && (pos.x - apex.pos.x).abs() < APEX_TOLERANCE_X
        })
    }

    pub fn column_width(&self) -> f32 {
        self.width / BUCKET_COUNT as f32
    }

    /// Horizontal centre of a drop column
    pub fn column_center(&self, column: usize) -> f32 {
        let w = self.column_width();
        w * column as f32 + w / 2.0
    }

    /// Map a board x coordinate to its drop column
    pub fn column_at(&self, x: f32) -> Option<usize> {
        if !(0.0..self.width).contains(&x) {
            return None;
        }
        let column = (x / self.column_width()).floor() as usize;
        Some(column.min(BUCKET_COUNT - 1))
    }

    /// Add every static body and spring to the world
    pub fn install<W: PhysicsWorld>(&self, world: &mut W) -> Vec<BodyHandle> {
        let mut handles = Vec::with_capacity(self.pegs.len() + self.buckets.len() + 12);

        for wall in &self.walls {
            let handle = world.add_body(
                BodyDesc::rect(WALL_LABEL, wall.rect.center, wall.rect.size)
                    .dynamic()
                    .with_material(Material {
                        restitution: 0.2,
                        friction: 0.1,
                        friction_air: 0.05,
                        density: 0.05,
                    }),
            );
            for (anchor, local_point) in wall.springs {
                world.add_spring(SpringDesc {
                    anchor,
                    body: handle,
                    local_point,
                    stiffness: wall.stiffness,
                    damping: wall.damping,
                });
            }
            handles.push(handle);
        }

        let peg_material = Material {
            restitution: 0.5,
            friction: 0.05,
            ..Material::default()
        };
        for peg in &self.pegs {
            handles.push(world.add_body(
                BodyDesc::circle(PEG_LABEL, peg.pos, peg.radius).with_material(peg_material),
            ));
        }

        for bucket in &self.buckets {
            handles.push(world.add_body(BodyDesc::rect(
                bucket.label(),
                bucket.rect.center,
                bucket.rect.size,
            )));
        }

        for divider in &self.dividers {
            handles.push(world.add_body(BodyDesc::rect(
                DIVIDER_LABEL,
                divider.center,
                divider.size,
            )));
        }

        log::debug!(
            "Board installed: {} pegs, {} buckets, {} dividers",
            self.pegs.len(),
            self.buckets.len(),
            self.dividers.len()
        );
        handles
    }
}

fn layout_pegs(width: f32, peg_radius: f32) -> Vec<Peg> {
    let spacing_x = width / PEG_COLS as f32;
    let mut pegs = Vec::with_capacity(PEG_ROWS * PEG_COLS);

    for row in 0..PEG_ROWS {
        let (offset_x, cols) = if row % 2 == 0 {
            (0.0, PEG_COLS)
        } else {
            (spacing_x / 2.0, PEG_COLS - 1)
        };
        let y = PEG_START_Y + row as f32 * PEG_SPACING_Y;

        for col in 0..cols {
            pegs.push(Peg {
                pos: Vec2::new(offset_x + col as f32 * spacing_x + spacing_x / 2.0, y),
                radius: peg_radius,
                apex: false,
            });
        }
    }

    // Apex: top-row peg nearest the horizontal centre
    let center = width / 2.0;
    if let Some(apex) = pegs
        .iter_mut()
        .filter(|p| p.pos.y == PEG_START_Y)
        .min_by(|a, b| {
            (a.pos.x - center)
                .abs()
                .partial_cmp(&(b.pos.x - center).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        apex.apex = true;
    }

    pegs
}

fn layout_buckets(width: f32, height: f32) -> Vec<Bucket> {
    let bucket_width = width / BUCKET_COUNT as f32;
    (0..BUCKET_COUNT)
        .map(|index| Bucket {
            index,
            rect: Rect {
                center: Vec2::new(
                    index as f32 * bucket_width + bucket_width / 2.0,
                    height - BUCKET_HEIGHT / 2.0,
                ),
                size: Vec2::new(bucket_width, BUCKET_HEIGHT),
            },
            gold: GOLD_BUCKETS.contains(&index),
        })
        .collect()
}

fn layout_dividers(width: f32, height: f32) -> Vec<Rect> {
    let bucket_width = width / BUCKET_COUNT as f32;
    (0..=BUCKET_COUNT)
        .map(|i| Rect {
            center: Vec2::new(i as f32 * bucket_width, height - BUCKET_HEIGHT - 20.0),
            size: Vec2::new(DIVIDER_WIDTH, DIVIDER_HEIGHT),
        })
        .collect()
}

fn spring_wall(x: f32, height: f32) -> SpringWall {
    SpringWall {
        rect: Rect {
            center: Vec2::new(x, height / 2.0),
            size: Vec2::new(WALL_THICKNESS, height),
        },
        springs: [
            (Vec2::new(x, 0.0), Vec2::new(0.0, -height / 2.0)),
            (Vec2::new(x, height), Vec2::new(0.0, height / 2.0)),
        ],
        stiffness: SPRING_STIFFNESS,
        damping: SPRING_DAMPING,
    }
}
