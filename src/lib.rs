//! Canvas Arcade - three small canvas arcade games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (snake, dodge/crush, space shooter)
//! - `session`: One running game plus its input routing
//! - `renderer`: Scene building and Canvas 2D playback
//! - `platform`: Browser input mapping
//! - `persistence`: Key/value storage (LocalStorage on web)
//! - `widgets`: Visitor counter and weather page glue

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod widgets;

pub use error::{ArcadeError, Result};
pub use highscores::HighScore;
pub use session::{GameKind, Session};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default canvas size when the page doesn't provide one
    pub const DEFAULT_CANVAS_WIDTH: f32 = 400.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 400.0;

    /// Snake ticks on a 100 ms timer
    pub const SNAKE_TICK_MS: f64 = 100.0;
    /// Frame-driven games tick at 60 Hz
    pub const FRAME_TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Snake grid cell size in pixels
    pub const TILE_SIZE: f32 = 20.0;
    /// Food older than this is rotten
    pub const FOOD_ROT_MS: f64 = 5000.0;
    /// Food older than this is removed from the board
    pub const FOOD_EXPIRE_MS: f64 = 15_000.0;
    /// Wall/self collisions are ignored for this long after a round starts
    pub const SNAKE_GRACE_MS: f64 = 5000.0;

    /// Dodge/Crush difficulty ramp
    pub const DODGE_SPEED_MILESTONE: u64 = 300;
    pub const DODGE_SPEED_STEP: f32 = 0.5;

    /// Space shooter global speed scale (75% of the arcade original)
    pub const SPACE_SPEED_FACTOR: f32 = 0.75;
    /// World is this many viewports wide and tall
    pub const SPACE_WORLD_SCALE: f32 = 2.0;
    pub const SPACE_SPAWN_DELAY_MS: f64 = 500.0;
    pub const SPACE_SPAWN_RAMP_MS: f64 = 5000.0;
    /// Evaders flee from projectiles inside this radius
    pub const EVADE_RADIUS: f32 = 100.0;
    pub const STAR_COUNT: usize = 200;
    /// Explosion lifetime in ticks
    pub const EXPLOSION_TICKS: u32 = 15;

    /// Background music volume
    pub const MUSIC_VOLUME: f32 = 0.5;
    /// Minimum swipe length (pixels) recognized as a turn
    pub const SWIPE_THRESHOLD: f32 = 20.0;
}

/// Clamp both components of a point into `[min, max]`
#[inline]
pub fn clamp_vec(p: glam::Vec2, min: glam::Vec2, max: glam::Vec2) -> glam::Vec2 {
    // Vec2::clamp asserts min <= max; a world smaller than the entity collapses to min
    glam::Vec2::new(p.x.min(max.x).max(min.x), p.y.min(max.y).max(min.y))
}
