//! Browser bindings
//!
//! The page owns rendering, input and storage. It drives `WebGame` from its
//! animation frame and reads events back as JSON.

use wasm_bindgen::prelude::*;

use crate::physics::RapierWorld;
use crate::sim::{Game, PhysicsWorld};
use crate::{HighScores, Initials, Review, Tuning};

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the existing logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Plinko core loaded");
}

/// One board plus its leaderboard
#[wasm_bindgen]
pub struct WebGame {
    game: Game<RapierWorld>,
    high_scores: HighScores,
}

#[wasm_bindgen]
impl WebGame {
    /// Build a board. `tuning_json` overrides any subset of the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<WebGame, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(js_error)?,
            None => Tuning::default(),
        };
        let seed = super::clock_seed();
        log::info!("Game initialized with seed: {}", seed);
        let world = RapierWorld::new(tuning.gravity);
        Ok(Self {
            game: Game::with_seed(world, tuning, seed),
            high_scores: HighScores::new(),
        })
    }

    pub fn start_game(&mut self) {
        self.game.start_game();
    }

    /// Returns false when the drop was ignored
    pub fn drop_disk(&mut self, column: usize) -> bool {
        self.game.drop_disk(column).is_some()
    }

    /// Drop under a click at board x
    pub fn drop_at(&mut self, x: f32) -> bool {
        self.game.drop_at(x).is_some()
    }

    pub fn tick(&mut self, dt_ms: f32) {
        self.game.tick(dt_ms);
    }

    pub fn score(&self) -> f64 {
        self.game.score() as f64
    }

    pub fn disks_remaining(&self) -> u32 {
        self.game.disks_remaining()
    }

    pub fn is_active(&self) -> bool {
        self.game.is_active()
    }

    pub fn is_over(&self) -> bool {
        self.game.is_over()
    }

    pub fn bucket_values(&self) -> Vec<u32> {
        self.game.bucket_values().to_vec()
    }

    /// Live disk centres as a flat `[x0, y0, x1, y1, ...]` array
    pub fn disk_positions(&self) -> Vec<f32> {
        self.game
            .disks()
            .iter()
            .filter_map(|d| self.game.world().position(d.handle))
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.drain_events()).map_err(js_error)
    }

    /// Record the current score. Returns the 1-based rank, if it placed.
    pub fn submit_score(&mut self, initials: &str) -> Result<Option<u32>, JsValue> {
        let initials = Initials::parse(initials).map_err(js_error)?;
        let rank = self
            .high_scores
            .add_score(initials, self.game.score(), super::clock_ms());
        Ok(rank.map(|r| r as u32))
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.high_scores).map_err(js_error)
    }

    /// Restore a leaderboard previously saved by the page
    pub fn load_high_scores(&mut self, json: &str) -> Result<(), JsValue> {
        self.high_scores = serde_json::from_str(json).map_err(js_error)?;
        Ok(())
    }

    pub fn submit_review(&mut self, rating: u8, initials: &str, comment: &str) -> Result<(), JsValue> {
        let review = Review::new(rating, initials, comment).map_err(js_error)?;
        self.game.submit_review(review).map_err(js_error)
    }
}
