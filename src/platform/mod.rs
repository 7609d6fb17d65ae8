//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time and seeding
//! - JavaScript bindings (`web::WebGame`, wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Milliseconds since the Unix epoch
pub fn clock_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// RNG seed taken from the clock, for rounds nobody needs to replay
pub fn clock_seed() -> u64 {
    clock_ms() as u64
}
