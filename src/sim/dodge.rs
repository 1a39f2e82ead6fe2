//! Dodge/Crush: falling blocks, one small player box
//!
//! Score ticks up every frame the player survives; every milestone the blocks
//! fall faster. `crush` drops one huge slab at a time, `dodge` rains small
//! blocks on a timer and lets the player move in both axes.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::{Game, GameEvent, GamePhase, RoundEnd};
use crate::consts::*;

/// Axes the player may move along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axes {
    Horizontal,
    Both,
}

/// When new blocks appear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnRule {
    /// Only once the screen is clear
    WhenEmpty,
    /// On a fixed cadence, and immediately when the screen is clear
    Interval { every_ms: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DodgeConfig {
    pub width: f32,
    pub height: f32,
    pub tick_ms: f64,
    pub player_size: Vec2,
    /// Top-left corner of the player at round start
    pub player_start: Vec2,
    /// Pixels per tick
    pub player_speed: f32,
    pub axes: Axes,
    pub block_min_width: f32,
    pub block_max_width: f32,
    pub block_height: f32,
    pub spawn: SpawnRule,
    /// Block fall speed at round start, pixels per tick
    pub start_speed: f32,
    pub speed_step: f32,
    pub speed_milestone: u64,
}

impl DodgeConfig {
    /// One slab at a time, player pinned to the bottom row
    pub fn crush(width: f32, height: f32) -> Self {
        let player_size = Vec2::splat(20.0);
        Self {
            width,
            height,
            tick_ms: FRAME_TICK_MS,
            player_size,
            player_start: Vec2::new(width / 2.0 - player_size.x / 2.0, height - player_size.y),
            player_speed: 5.0,
            axes: Axes::Horizontal,
            block_min_width: 50.0,
            block_max_width: (width * 0.5).max(50.0),
            block_height: 300.0,
            spawn: SpawnRule::WhenEmpty,
            start_speed: 1.0,
            speed_step: DODGE_SPEED_STEP,
            speed_milestone: DODGE_SPEED_MILESTONE,
        }
    }

    /// Small blocks on a timer, free movement from the centre
    pub fn dodge(width: f32, height: f32) -> Self {
        let player_size = Vec2::splat(20.0);
        Self {
            player_start: Vec2::new(width, height) / 2.0 - player_size / 2.0,
            axes: Axes::Both,
            block_min_width: 20.0,
            block_max_width: 60.0,
            block_height: 20.0,
            spawn: SpawnRule::Interval { every_ms: 600.0 },
            start_speed: 2.0,
            ..Self::crush(width, height)
        }
    }

    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Input commands for a single tick (held keys)
#[derive(Debug, Clone, Default)]
pub struct DodgeInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub restart: bool,
}

/// A falling obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub rect: Rect,
    pub spawned_ms: f64,
}

#[derive(Debug, Clone)]
pub struct DodgeState {
    pub config: DodgeConfig,
    pub player: Rect,
    pub blocks: Vec<Block>,
    /// Current fall speed, pixels per tick
    pub block_speed: f32,
    pub score: u64,
    pub phase: GamePhase,
    pub end_reason: Option<RoundEnd>,
    pub clock_ms: f64,
    last_spawn_ms: f64,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl DodgeState {
    pub fn new(config: DodgeConfig, seed: u64) -> Self {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(config: DodgeConfig, rng: Pcg32) -> Self {
        let player = Rect {
            pos: config.player_start,
            size: config.player_size,
        }
        .clamped_within(config.bounds());
        Self {
            player,
            blocks: Vec::new(),
            block_speed: config.start_speed,
            score: 0,
            phase: GamePhase::Playing,
            end_reason: None,
            clock_ms: 0.0,
            last_spawn_ms: 0.0,
            rng,
            events: Vec::new(),
            config,
        }
    }

    fn move_player(&mut self, input: &DodgeInput) {
        let speed = self.config.player_speed;
        let mut delta = Vec2::ZERO;
        if input.left {
            delta.x -= speed;
        }
        if input.right {
            delta.x += speed;
        }
        if self.config.axes == Axes::Both {
            if input.up {
                delta.y -= speed;
            }
            if input.down {
                delta.y += speed;
            }
        }
        self.player.pos += delta;
        self.player = self.player.clamped_within(self.config.bounds());
    }

    fn spawn_block(&mut self) {
        let w = self
            .rng
            .random_range(self.config.block_min_width..=self.config.block_max_width)
            .min(self.config.width);
        let x = self.rng.random::<f32>() * (self.config.width - w).max(0.0);
        let h = self.config.block_height;
        self.blocks.push(Block {
            rect: Rect::new(x, -h, w, h),
            spawned_ms: self.clock_ms,
        });
        self.last_spawn_ms = self.clock_ms;
    }

    fn spawn_due(&self) -> bool {
        if self.blocks.is_empty() {
            return true;
        }
        match self.config.spawn {
            SpawnRule::WhenEmpty => false,
            SpawnRule::Interval { every_ms } => self.clock_ms - self.last_spawn_ms >= every_ms,
        }
    }

    fn end_round(&mut self, reason: RoundEnd) {
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(reason);
        self.events.push(GameEvent::RoundOver {
            score: self.score,
            reason,
        });
        log::info!("Dodge round over, score {}", self.score);
    }
}

impl Game for DodgeState {
    type Input = DodgeInput;

    fn tick_ms(&self) -> f64 {
        self.config.tick_ms
    }

    fn tick(&mut self, input: &DodgeInput) {
        if self.phase == GamePhase::GameOver {
            if input.restart {
                self.restart();
            }
            return;
        }

        self.clock_ms += self.config.tick_ms;
        self.move_player(input);

        if self.spawn_due() {
            self.spawn_block();
        }

        let speed = self.block_speed;
        for block in &mut self.blocks {
            block.rect.pos.y += speed;
        }
        let height = self.config.height;
        self.blocks.retain(|b| b.rect.pos.y < height);

        if self.blocks.iter().any(|b| b.rect.overlaps(&self.player)) {
            self.end_round(RoundEnd::Crushed);
            return;
        }

        self.score += 1;
        self.events.push(GameEvent::Scored { score: self.score });
        if self.score % self.config.speed_milestone == 0 {
            self.block_speed += self.config.speed_step;
            log::debug!("Block speed now {}", self.block_speed);
        }
    }

    fn restart(&mut self) {
        let rng = self.rng.clone();
        *self = Self::with_rng(self.config.clone(), rng);
        self.events.push(GameEvent::Restarted);
        log::info!("Dodge restarted");
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn centred_crush() -> DodgeState {
        let mut config = DodgeConfig::crush(400.0, 400.0);
        config.player_start = Vec2::new(190.0, 190.0);
        DodgeState::new(config, 42)
    }

    #[test]
    fn test_spawns_when_empty() {
        let mut state = DodgeState::new(DodgeConfig::crush(400.0, 600.0), 1);
        state.tick(&DodgeInput::default());
        assert_eq!(state.blocks.len(), 1);
        let b = &state.blocks[0].rect;
        assert!(b.size.x >= 50.0 && b.size.x <= 200.0);
        assert_eq!(b.pos.y, -300.0 + 1.0);
        assert!(b.pos.x >= 0.0 && b.right() <= 400.0);

        // One slab at a time
        state.tick(&DodgeInput::default());
        assert_eq!(state.blocks.len(), 1);
    }

    #[test]
    fn test_falling_block_ends_round() {
        let mut state = centred_crush();
        state.blocks.push(Block {
            rect: Rect::new(185.0, -30.0, 30.0, 30.0),
            spawned_ms: 0.0,
        });

        let mut ticks = 0;
        while state.phase == GamePhase::Playing && ticks < 1000 {
            state.tick(&DodgeInput::default());
            ticks += 1;
        }

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.end_reason, Some(RoundEnd::Crushed));
        // Bottom edge passes the player's top (y = 190) on tick 191
        assert_eq!(ticks, 191);
        assert_eq!(state.score, 190);
    }

    #[test]
    fn test_block_beside_player_is_harmless() {
        let mut state = centred_crush();
        state.blocks.push(Block {
            rect: Rect::new(0.0, -30.0, 100.0, 30.0),
            spawned_ms: 0.0,
        });
        for _ in 0..300 {
            state.tick(&DodgeInput::default());
        }
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_off_screen_blocks_removed() {
        let mut state = DodgeState::new(DodgeConfig::crush(400.0, 400.0), 3);
        state.player.pos.x = 0.0;
        state.blocks.push(Block {
            rect: Rect::new(300.0, 399.5, 50.0, 300.0),
            spawned_ms: 0.0,
        });
        state.tick(&DodgeInput::default());
        assert!(state.blocks.iter().all(|b| b.rect.pos.y < 400.0));
    }

    #[test]
    fn test_speed_increases_every_milestone() {
        let mut state = DodgeState::new(DodgeConfig::crush(400.0, 400.0), 3);
        state.score = DODGE_SPEED_MILESTONE - 1;
        state.blocks.push(Block {
            rect: Rect::new(300.0, -1000.0, 50.0, 300.0),
            spawned_ms: 0.0,
        });
        state.player.pos.x = 0.0;
        state.tick(&DodgeInput::default());
        assert_eq!(state.score, DODGE_SPEED_MILESTONE);
        assert_eq!(state.block_speed, 1.0 + DODGE_SPEED_STEP);
    }

    #[test]
    fn test_crush_ignores_vertical_input() {
        let mut state = DodgeState::new(DodgeConfig::crush(400.0, 400.0), 3);
        let y = state.player.pos.y;
        state.tick(&DodgeInput {
            up: true,
            left: true,
            ..Default::default()
        });
        assert_eq!(state.player.pos.y, y);
        assert_eq!(state.player.pos.x, 190.0 - 5.0);
    }

    #[test]
    fn test_interval_spawning() {
        let mut state = DodgeState::new(DodgeConfig::dodge(400.0, 400.0), 3);
        // First block on tick 1, second roughly 600 ms later
        for _ in 0..40 {
            state.tick(&DodgeInput::default());
        }
        assert_eq!(state.blocks.len(), 2);
    }

    #[test]
    fn test_restart() {
        let mut state = centred_crush();
        state.blocks.push(Block {
            rect: Rect::new(185.0, 180.0, 30.0, 30.0),
            spawned_ms: 0.0,
        });
        state.tick(&DodgeInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        state.tick(&DodgeInput {
            restart: true,
            ..Default::default()
        });
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.blocks.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.block_speed, 1.0);
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_bounds(
            seed in any::<u64>(),
            moves in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 1..400),
        ) {
            let mut state = DodgeState::new(DodgeConfig::dodge(320.0, 240.0), seed);
            for (left, right, up, down) in moves {
                state.tick(&DodgeInput { left, right, up, down, restart: true });
                let p = state.player;
                prop_assert!(p.pos.x >= 0.0 && p.pos.x <= 320.0 - p.size.x);
                prop_assert!(p.pos.y >= 0.0 && p.pos.y <= 240.0 - p.size.y);
                prop_assert!(state.blocks.iter().all(|b| b.rect.pos.y < 240.0));
            }
        }
    }
}
