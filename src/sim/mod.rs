//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (each state owns a simulated clock)
//! - Seeded RNG only
//! - Stable iteration order (entities keep spawn order)
//! - No rendering or platform dependencies

pub mod dodge;
pub mod geom;
pub mod snake;
pub mod space;
pub mod stepper;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use dodge::{DodgeConfig, DodgeInput, DodgeState};
pub use geom::Rect;
pub use snake::{Direction, SnakeConfig, SnakeInput, SnakeState};
pub use space::{EnemyKind, SpaceConfig, SpaceInput, SpaceState};
pub use stepper::FixedStep;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first qualifying input
    Ready,
    /// Active gameplay
    Playing,
    /// Round ended, waiting for a restart action
    GameOver,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEnd {
    HitWall,
    HitSelf,
    AteRotten,
    Crushed,
    Caught,
}

impl RoundEnd {
    /// Headline shown on the game-over overlay
    pub fn message(&self) -> &'static str {
        match self {
            RoundEnd::HitWall | RoundEnd::HitSelf | RoundEnd::Crushed => "Game Over!",
            RoundEnd::AteRotten => "Oh no, you ate rotten food!",
            RoundEnd::Caught => "Game Over",
        }
    }
}

/// Something the shell may want to react to (sound, HUD, storage)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// First qualifying input moved the round out of `Ready`
    Started,
    /// Score changed to the given value
    Scored { score: u64 },
    /// An enemy was destroyed at this world position
    Explosion { at: Vec2 },
    /// Round ended
    RoundOver { score: u64, reason: RoundEnd },
    /// State was rebuilt for a new round
    Restarted,
}

/// A single game simulation driven by the fixed-timestep loop
pub trait Game {
    /// Per-tick input commands
    type Input: Default;

    /// Length of one simulation tick in milliseconds
    fn tick_ms(&self) -> f64;

    /// Advance the game by one tick
    fn tick(&mut self, input: &Self::Input);

    /// Rebuild the round from its configuration (score 0, empty collections)
    fn restart(&mut self);

    fn phase(&self) -> GamePhase;

    fn score(&self) -> u64;

    /// Take the events produced since the last call
    fn drain_events(&mut self) -> Vec<GameEvent>;
}
