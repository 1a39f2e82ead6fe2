//! One running game on the page
//!
//! A [`Session`] owns the game state for the `data-game` kind on the canvas,
//! its high score and its fixed-timestep scheduler.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::error::{ArcadeError, Result};
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::platform::InputState;
use crate::renderer::scene::{self, DrawCmd, Hud};
use crate::settings::Settings;
use crate::sim::{
    DodgeConfig, DodgeState, FixedStep, Game, GameEvent, GamePhase, SnakeConfig, SnakeState,
    SpaceConfig, SpaceState,
};

/// Which game a canvas runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Snake,
    SnakeRivals,
    Crush,
    Dodge,
    Space,
}

impl GameKind {
    pub const ALL: [GameKind; 5] = [
        GameKind::Snake,
        GameKind::SnakeRivals,
        GameKind::Crush,
        GameKind::Dodge,
        GameKind::Space,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::SnakeRivals => "snake-rivals",
            GameKind::Crush => "crush",
            GameKind::Dodge => "dodge",
            GameKind::Space => "space",
        }
    }

    /// Both snake variants share one high score
    pub fn storage_key(self) -> &'static str {
        match self {
            GameKind::Snake | GameKind::SnakeRivals => "snake-highscore",
            GameKind::Crush => "crush-highscore",
            GameKind::Dodge => "dodge-highscore",
            GameKind::Space => "space-highscore",
        }
    }
}

impl FromStr for GameKind {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        GameKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or(ArcadeError::UnknownGame(s))
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum ActiveGame {
    Snake(SnakeState),
    Dodge(DodgeState),
    Space(SpaceState),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub kind: GameKind,
    pub game: ActiveGame,
    pub high: HighScore,
    canvas: Vec2,
    stepper: FixedStep,
}

impl Session {
    /// Build the game sized to the canvas
    pub fn new(kind: GameKind, canvas: Vec2, seed: u64, high: HighScore) -> Self {
        let game = match kind {
            GameKind::Snake => ActiveGame::Snake(SnakeState::new(SnakeConfig::classic(canvas.x, canvas.y), seed)),
            GameKind::SnakeRivals => {
                ActiveGame::Snake(SnakeState::new(SnakeConfig::rivals(canvas.x, canvas.y), seed))
            }
            GameKind::Crush => {
                ActiveGame::Dodge(DodgeState::new(DodgeConfig::crush(canvas.x, canvas.y), seed))
            }
            GameKind::Dodge => {
                ActiveGame::Dodge(DodgeState::new(DodgeConfig::dodge(canvas.x, canvas.y), seed))
            }
            GameKind::Space => {
                ActiveGame::Space(SpaceState::new(SpaceConfig::arcade(canvas.x, canvas.y), seed))
            }
        };
        let step_ms = match &game {
            ActiveGame::Snake(s) => s.tick_ms(),
            ActiveGame::Dodge(s) => s.tick_ms(),
            ActiveGame::Space(s) => s.tick_ms(),
        };
        log::info!("{kind} ready ({}x{}, seed {seed})", canvas.x, canvas.y);
        Self {
            kind,
            game,
            high,
            canvas,
            stepper: FixedStep::new(step_ms),
        }
    }

    /// Same as [`Session::new`] with the high score read from `store`
    pub fn open<S: KeyValueStore + ?Sized>(kind: GameKind, canvas: Vec2, seed: u64, store: &S) -> Self {
        let high = HighScore::load(store, kind.storage_key());
        Self::new(kind, canvas, seed, high)
    }

    /// Replace the running game with a fresh `kind` on the same canvas
    pub fn switch_to<S: KeyValueStore + ?Sized>(&mut self, kind: GameKind, seed: u64, store: &S) {
        log::info!("Switching from {} to {kind}", self.kind);
        *self = Self::open(kind, self.canvas, seed, store);
    }

    pub fn phase(&self) -> GamePhase {
        match &self.game {
            ActiveGame::Snake(s) => s.phase(),
            ActiveGame::Dodge(s) => s.phase(),
            ActiveGame::Space(s) => s.phase(),
        }
    }

    pub fn score(&self) -> u64 {
        match &self.game {
            ActiveGame::Snake(s) => s.score(),
            ActiveGame::Dodge(s) => s.score(),
            ActiveGame::Space(s) => s.score(),
        }
    }

    /// Run exactly one simulation tick
    pub fn tick<S: KeyValueStore + ?Sized>(&mut self, input: &mut InputState, store: &mut S) -> Vec<GameEvent> {
        let events = match &mut self.game {
            ActiveGame::Snake(s) => {
                let cmd = input.snake_input();
                s.tick(&cmd);
                s.drain_events()
            }
            ActiveGame::Dodge(s) => {
                let cmd = input.dodge_input();
                s.tick(&cmd);
                s.drain_events()
            }
            ActiveGame::Space(s) => {
                let cmd = input.space_input(|p| s.aim_from_screen(p));
                s.tick(&cmd);
                s.drain_events()
            }
        };

        for event in &events {
            match *event {
                GameEvent::Scored { score } | GameEvent::RoundOver { score, .. } => {
                    if let Err(e) = self.high.record(score, store) {
                        log::warn!("Could not save high score: {e}");
                    }
                }
                GameEvent::Restarted => self.stepper.reset(),
                _ => {}
            }
        }
        events
    }

    /// Run however many ticks the frame time allows.
    /// One-shot inputs are consumed by the first tick only.
    pub fn frame<S: KeyValueStore + ?Sized>(
        &mut self,
        now_ms: f64,
        input: &mut InputState,
        store: &mut S,
    ) -> Vec<GameEvent> {
        let steps = self.stepper.advance(now_ms);
        let mut events = Vec::new();
        for i in 0..steps {
            events.extend(self.tick(input, store));
            if i == 0 {
                input.clear_one_shots();
            }
        }
        events
    }

    /// Forget frame timing, e.g. after the tab was hidden
    pub fn pause_clock(&mut self) {
        self.stepper.reset();
    }

    pub fn scene(&self, settings: &Settings) -> Vec<DrawCmd> {
        let hud = Hud {
            high_score: self.high.best,
            flash: settings.game_over_flash(),
        };
        match &self.game {
            ActiveGame::Snake(s) => scene::snake_scene(s, &hud),
            ActiveGame::Dodge(s) => scene::dodge_scene(s, &hud),
            ActiveGame::Space(s) => scene::space_scene(s, &hud),
        }
    }
}
