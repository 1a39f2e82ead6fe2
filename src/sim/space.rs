//! Geometry Wars style space shooter
//!
//! The world is larger than the viewport; the camera follows the player.
//! Enemies come in three kinds, each mapped to a pure movement function in
//! [`EnemyKind::behavior`], so collision and drawing never look at the kind.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::{heading, within};
use super::{Game, GameEvent, GamePhase, RoundEnd};
use crate::clamp_vec;
use crate::consts::*;

/// Enemy behavior kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Drifts diagonally, bouncing off the world edges (red)
    Patrol,
    /// Homes in on the player (yellow)
    Chaser,
    /// Homes in on the player but backs away from nearby projectiles (purple)
    Evader,
}

/// Where a movement function wants an enemy to be next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// What an enemy can see when deciding how to move
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub player: Vec2,
    pub projectiles: &'a [Projectile],
    pub world: Vec2,
    /// Pixels per tick for homing movement
    pub speed: f32,
    pub evade_radius: f32,
}

pub type Behavior = fn(&Enemy, &Surroundings<'_>) -> Motion;

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Patrol, EnemyKind::Chaser, EnemyKind::Evader];

    pub fn behavior(self) -> Behavior {
        match self {
            EnemyKind::Patrol => patrol,
            EnemyKind::Chaser => chase,
            EnemyKind::Evader => evade,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            EnemyKind::Patrol => "red",
            EnemyKind::Chaser => "yellow",
            EnemyKind::Evader => "purple",
        }
    }
}

fn patrol(enemy: &Enemy, s: &Surroundings<'_>) -> Motion {
    let half = enemy.size / 2.0;
    let pos = enemy.pos + enemy.vel;
    let mut vel = enemy.vel;
    // Bounce at the clamp limits, otherwise a clamped patrol sticks to the edge
    if pos.x < half || pos.x > s.world.x - half {
        vel.x = -vel.x;
    }
    if pos.y < half || pos.y > s.world.y - half {
        vel.y = -vel.y;
    }
    Motion { pos, vel }
}

fn chase(enemy: &Enemy, s: &Surroundings<'_>) -> Motion {
    Motion {
        pos: enemy.pos + heading(enemy.pos, s.player) * s.speed,
        vel: enemy.vel,
    }
}

fn evade(enemy: &Enemy, s: &Surroundings<'_>) -> Motion {
    let mut motion = chase(enemy, s);
    for p in s.projectiles {
        if within(p.pos, motion.pos, s.evade_radius) {
            motion.pos -= heading(motion.pos, p.pos) * s.speed;
        }
    }
    motion
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: EnemyKind,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Visual-only burst left where an enemy died
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    pub pos: Vec2,
    pub size: f32,
    pub ttl_ticks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceConfig {
    pub viewport: Vec2,
    pub world: Vec2,
    pub tick_ms: f64,
    pub player_size: f32,
    pub player_speed: f32,
    pub projectile_speed: f32,
    pub enemy_size: f32,
    pub enemy_speed: f32,
    pub spawn_delay_ms: f64,
    /// Spawn batch grows by one this often
    pub spawn_ramp_ms: f64,
    /// Enemies never spawn closer than this to the player
    pub safe_radius: f32,
    pub evade_radius: f32,
    pub star_count: usize,
}

impl SpaceConfig {
    /// World twice the viewport, everything at 75% arcade speed
    pub fn arcade(viewport_w: f32, viewport_h: f32) -> Self {
        let viewport = Vec2::new(viewport_w, viewport_h);
        Self {
            viewport,
            world: viewport * SPACE_WORLD_SCALE,
            tick_ms: FRAME_TICK_MS,
            player_size: 20.0,
            player_speed: 5.0 * SPACE_SPEED_FACTOR,
            projectile_speed: 10.0 * SPACE_SPEED_FACTOR,
            enemy_size: 20.0,
            enemy_speed: 2.0 * SPACE_SPEED_FACTOR,
            spawn_delay_ms: SPACE_SPAWN_DELAY_MS,
            spawn_ramp_ms: SPACE_SPAWN_RAMP_MS,
            safe_radius: 100.0,
            evade_radius: EVADE_RADIUS,
            star_count: STAR_COUNT,
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct SpaceInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Shots fired this tick, as directions in world space (any length)
    pub fire: Vec<Vec2>,
    pub restart: bool,
}

impl SpaceInput {
    fn moving(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[derive(Debug, Clone)]
pub struct SpaceState {
    pub config: SpaceConfig,
    /// Player centre in world space
    pub player: Vec2,
    pub projectiles: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    pub explosions: Vec<Explosion>,
    pub stars: Vec<Vec2>,
    pub score: u64,
    pub phase: GamePhase,
    pub end_reason: Option<RoundEnd>,
    pub clock_ms: f64,
    /// Enemies per spawn batch
    pub spawn_count: u32,
    last_spawn_ms: f64,
    last_ramp_ms: f64,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl SpaceState {
    pub fn new(config: SpaceConfig, seed: u64) -> Self {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(config: SpaceConfig, mut rng: Pcg32) -> Self {
        let stars = (0..config.star_count)
            .map(|_| Vec2::new(rng.random::<f32>(), rng.random::<f32>()) * config.world)
            .collect();
        Self {
            player: config.world / 2.0,
            projectiles: Vec::new(),
            enemies: Vec::new(),
            explosions: Vec::new(),
            stars,
            score: 0,
            phase: GamePhase::Ready,
            end_reason: None,
            clock_ms: 0.0,
            spawn_count: 1,
            last_spawn_ms: 0.0,
            last_ramp_ms: 0.0,
            rng,
            events: Vec::new(),
            config,
        }
    }

    /// Top-left of the viewport in world space, clamped to the world
    pub fn camera_offset(&self) -> Vec2 {
        let viewport = self.config.viewport;
        clamp_vec(
            self.player - viewport / 2.0,
            Vec2::ZERO,
            (self.config.world - viewport).max(Vec2::ZERO),
        )
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera_offset() + screen
    }

    /// Direction from the player to a point on screen (e.g. a click)
    pub fn aim_from_screen(&self, screen: Vec2) -> Vec2 {
        self.screen_to_world(screen) - self.player
    }

    /// Leave the start screen
    pub fn begin(&mut self) {
        if self.phase != GamePhase::Ready {
            return;
        }
        self.phase = GamePhase::Playing;
        self.last_spawn_ms = self.clock_ms;
        self.last_ramp_ms = self.clock_ms;
        self.events.push(GameEvent::Started);
        log::info!("Space round started");
    }

    /// Launch a projectile from the player; zero-length aims are ignored
    pub fn fire(&mut self, direction: Vec2) {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        self.projectiles.push(Projectile {
            pos: self.player,
            vel: dir * self.config.projectile_speed,
        });
    }

    fn clamp_enemy(world: Vec2, enemy: &mut Enemy) {
        let half = Vec2::splat(enemy.size / 2.0);
        enemy.pos = clamp_vec(enemy.pos, half, world - half);
    }

    fn move_player(&mut self, input: &SpaceInput) {
        let speed = self.config.player_speed;
        if input.up {
            self.player.y -= speed;
        }
        if input.down {
            self.player.y += speed;
        }
        if input.left {
            self.player.x -= speed;
        }
        if input.right {
            self.player.x += speed;
        }
        let half = Vec2::splat(self.config.player_size / 2.0);
        self.player = clamp_vec(self.player, half, self.config.world - half);
    }

    fn move_projectiles(&mut self) {
        let world = self.config.world;
        for p in &mut self.projectiles {
            p.pos += p.vel;
        }
        self.projectiles.retain(|p| {
            p.pos.x >= 0.0 && p.pos.x <= world.x && p.pos.y >= 0.0 && p.pos.y <= world.y
        });
    }

    fn spawn_point(&mut self) -> Vec2 {
        let world = self.config.world;
        let half = Vec2::splat(self.config.enemy_size / 2.0);
        for _ in 0..16 {
            let p = Vec2::new(self.rng.random::<f32>(), self.rng.random::<f32>()) * world;
            let p = clamp_vec(p, half, world - half);
            if !within(p, self.player, self.config.safe_radius) {
                return p;
            }
        }
        // Farthest corner from the player
        let x = if self.player.x < world.x / 2.0 { world.x - half.x } else { half.x };
        let y = if self.player.y < world.y / 2.0 { world.y - half.y } else { half.y };
        Vec2::new(x, y)
    }

    fn spawn_enemies(&mut self) {
        if self.clock_ms - self.last_spawn_ms > self.config.spawn_delay_ms {
            for _ in 0..self.spawn_count {
                let kind = EnemyKind::ALL[self.rng.random_range(0..EnemyKind::ALL.len())];
                let speed = self.config.enemy_speed;
                let vx = if self.rng.random_bool(0.5) { speed } else { -speed };
                let vy = if self.rng.random_bool(0.5) { speed } else { -speed };
                let pos = self.spawn_point();
                self.enemies.push(Enemy {
                    pos,
                    vel: Vec2::new(vx, vy),
                    kind,
                    size: self.config.enemy_size,
                });
            }
            self.last_spawn_ms = self.clock_ms;
        }
        if self.clock_ms - self.last_ramp_ms > self.config.spawn_ramp_ms {
            self.spawn_count += 1;
            self.last_ramp_ms = self.clock_ms;
            log::debug!("Spawn batch now {}", self.spawn_count);
        }
    }

    fn move_enemies(&mut self) {
        let world = self.config.world;
        let surroundings = Surroundings {
            player: self.player,
            projectiles: &self.projectiles,
            world,
            speed: self.config.enemy_speed,
            evade_radius: self.config.evade_radius,
        };
        for enemy in &mut self.enemies {
            let motion = (enemy.kind.behavior())(enemy, &surroundings);
            enemy.pos = motion.pos;
            enemy.vel = motion.vel;
            Self::clamp_enemy(world, enemy);
        }
    }

    /// Pairwise nudge so overlapping enemies drift apart
    fn separate_enemies(&mut self) {
        let world = self.config.world;
        let n = self.enemies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.enemies.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                let d = a.pos - b.pos;
                let dist = d.length();
                if dist < a.size {
                    let push = if dist > 0.0 { d / dist } else { Vec2::X };
                    a.pos += push;
                    b.pos -= push;
                }
            }
        }
        for enemy in &mut self.enemies {
            Self::clamp_enemy(world, enemy);
        }
    }

    /// Contact is checked against the enemies as they stand before this
    /// tick's kills, so shooting a touching enemy does not save the player.
    fn resolve_hits(&mut self) {
        let player = self.player;
        let reach = self.config.player_size;
        let caught = self.enemies.iter().any(|e| within(player, e.pos, reach));

        let enemies = std::mem::take(&mut self.enemies);
        for enemy in enemies {
            let hit = self
                .projectiles
                .iter()
                .any(|p| within(p.pos, enemy.pos, enemy.size));
            if hit {
                self.score += 1;
                self.explosions.push(Explosion {
                    pos: enemy.pos,
                    size: enemy.size,
                    ttl_ticks: EXPLOSION_TICKS,
                });
                self.events.push(GameEvent::Explosion { at: enemy.pos });
                self.events.push(GameEvent::Scored { score: self.score });
            } else {
                self.enemies.push(enemy);
            }
        }

        if caught {
            self.phase = GamePhase::GameOver;
            self.end_reason = Some(RoundEnd::Caught);
            self.events.push(GameEvent::RoundOver {
                score: self.score,
                reason: RoundEnd::Caught,
            });
            log::info!("Space round over, score {}", self.score);
        }
    }

    fn fade_explosions(&mut self) {
        for e in &mut self.explosions {
            e.ttl_ticks = e.ttl_ticks.saturating_sub(1);
        }
        self.explosions.retain(|e| e.ttl_ticks > 0);
    }
}

impl Game for SpaceState {
    type Input = SpaceInput;

    fn tick_ms(&self) -> f64 {
        self.config.tick_ms
    }

    fn tick(&mut self, input: &SpaceInput) {
        if self.phase == GamePhase::GameOver {
            if input.restart {
                self.restart();
            }
            return;
        }

        self.clock_ms += self.config.tick_ms;
        self.fade_explosions();

        if self.phase == GamePhase::Ready {
            if !input.moving() {
                return;
            }
            self.begin();
        }

        self.move_player(input);
        for &dir in &input.fire {
            self.fire(dir);
        }
        self.move_projectiles();
        self.spawn_enemies();
        self.move_enemies();
        self.separate_enemies();
        self.resolve_hits();
    }

    fn restart(&mut self) {
        let rng = self.rng.clone();
        *self = Self::with_rng(self.config.clone(), rng);
        self.events.push(GameEvent::Restarted);
        log::info!("Space restarted");
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

    fn playing() -> SpaceState {
        let mut state = SpaceState::new(SpaceConfig::arcade(400.0, 400.0), 2024);
        state.begin();
        state.drain_events();
        state
    }

    fn still(kind: EnemyKind, x: f32, y: f32) -> Enemy {
        Enemy {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            kind,
            size: 20.0,
        }
    }

    #[test]
    fn test_waits_for_wasd() {
        let mut state = SpaceState::new(SpaceConfig::arcade(400.0, 400.0), 1);
        state.tick(&SpaceInput {
            fire: vec![Vec2::X],
            ..Default::default()
        });
        assert_eq!(state.phase, GamePhase::Ready);
        assert!(state.projectiles.is_empty());

        state.tick(&SpaceInput {
            up: true,
            ..Default::default()
        });
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player, Vec2::new(400.0, 400.0 - 5.0 * SPACE_SPEED_FACTOR));
    }

    #[test]
    fn test_projectile_kills_enemy() {
        let mut state = playing();
        state.enemies.push(still(EnemyKind::Patrol, 600.0, 600.0));
        state.projectiles.push(Projectile {
            pos: Vec2::new(600.0, 600.0),
            vel: Vec2::ZERO,
        });

        state.tick(&SpaceInput::default());

        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 1);
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.explosions[0].pos, Vec2::new(600.0, 600.0));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Explosion {
            at: Vec2::new(600.0, 600.0)
        }));
        assert!(events.contains(&GameEvent::Scored { score: 1 }));
    }

    #[test]
    fn test_enemy_touching_player_ends_round() {
        let mut state = playing();
        state.enemies.push(still(EnemyKind::Patrol, 410.0, 400.0));
        state.tick(&SpaceInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.end_reason, Some(RoundEnd::Caught));
    }

    #[test]
    fn test_point_blank_kill_still_ends_round() {
        let mut state = playing();
        let at = Vec2::new(410.0, 400.0);
        state.enemies.push(still(EnemyKind::Patrol, at.x, at.y));
        state.projectiles.push(Projectile {
            pos: at,
            vel: Vec2::ZERO,
        });

        state.tick(&SpaceInput::default());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.end_reason, Some(RoundEnd::Caught));
        // The kill still counts
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 1);
        assert!(state.drain_events().contains(&GameEvent::RoundOver {
            score: 1,
            reason: RoundEnd::Caught,
        }));
    }

    #[test]
    fn test_chaser_closes_in() {
        let mut state = playing();
        state.enemies.push(still(EnemyKind::Chaser, 600.0, 400.0));
        state.tick(&SpaceInput::default());
        let x = state.enemies[0].pos.x;
        assert!((x - (600.0 - 2.0 * SPACE_SPEED_FACTOR)).abs() < 1e-4);
    }

    #[test]
    fn test_evader_backs_off_from_projectiles() {
        let mut state = playing();
        state.enemies.push(still(EnemyKind::Evader, 600.0, 400.0));
        state.projectiles.push(Projectile {
            pos: Vec2::new(650.0, 400.0),
            vel: Vec2::ZERO,
        });
        state.tick(&SpaceInput::default());
        let speed = 2.0 * SPACE_SPEED_FACTOR;
        let x = state.enemies[0].pos.x;
        assert!((x - (600.0 - 2.0 * speed)).abs() < 1e-4);
    }

    #[test]
    fn test_patrol_bounces_off_edges() {
        let mut state = playing();
        let mut e = still(EnemyKind::Patrol, 11.0, 300.0);
        e.vel = Vec2::new(-1.5, 0.0);
        state.enemies.push(e);
        state.tick(&SpaceInput::default());
        assert_eq!(state.enemies[0].pos.x, 10.0);
        assert!(state.enemies[0].vel.x > 0.0);
        state.tick(&SpaceInput::default());
        assert!(state.enemies[0].pos.x > 10.0);
    }

    #[test]
    fn test_overlapping_enemies_separate() {
        let mut state = playing();
        state.enemies.push(still(EnemyKind::Patrol, 300.0, 300.0));
        state.enemies.push(still(EnemyKind::Patrol, 310.0, 300.0));
        state.tick(&SpaceInput::default());
        assert_eq!(state.enemies[0].pos, Vec2::new(299.0, 300.0));
        assert_eq!(state.enemies[1].pos, Vec2::new(311.0, 300.0));
    }

    #[test]
    fn test_projectiles_leave_world() {
        let mut state = playing();
        state.player = Vec2::new(790.0, 400.0);
        state.fire(Vec2::new(3.0, 0.0));
        state.fire(Vec2::ZERO);
        assert_eq!(state.projectiles.len(), 1);
        state.tick(&SpaceInput::default());
        state.tick(&SpaceInput::default());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_spawn_schedule() {
        let mut state = playing();
        let ticks_per_half_second = (SPACE_SPAWN_DELAY_MS / FRAME_TICK_MS) as usize + 2;
        for _ in 0..ticks_per_half_second {
            state.tick(&SpaceInput::default());
        }
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.spawn_count, 1);

        let ticks_to_ramp = (SPACE_SPAWN_RAMP_MS / FRAME_TICK_MS) as usize;
        state.enemies.clear();
        for _ in 0..ticks_to_ramp {
            state.tick(&SpaceInput::default());
            state.enemies.clear();
        }
        assert_eq!(state.spawn_count, 2);
    }

    #[test]
    fn test_spawns_keep_distance_from_player() {
        let mut state = playing();
        for _ in 0..200 {
            let p = state.spawn_point();
            assert!(!within(p, state.player, state.config.safe_radius));
        }
    }

    #[test]
    fn test_camera_offset() {
        let mut state = playing();
        assert_eq!(state.camera_offset(), Vec2::new(200.0, 200.0));
        state.player = Vec2::new(10.0, 790.0);
        assert_eq!(state.camera_offset(), Vec2::new(0.0, 400.0));
        assert_eq!(state.screen_to_world(Vec2::new(5.0, 5.0)), Vec2::new(5.0, 405.0));
        assert_eq!(state.aim_from_screen(Vec2::new(10.0, 390.0)), Vec2::ZERO);
    }

    #[test]
    fn test_restart_regenerates_world() {
        let mut state = playing();
        let stars = state.stars.clone();
        state.enemies.push(still(EnemyKind::Chaser, 400.0, 400.0));
        state.tick(&SpaceInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        state.tick(&SpaceInput {
            restart: true,
            ..Default::default()
        });
        assert_eq!(state.phase, GamePhase::Ready);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.spawn_count, 1);
        assert_eq!(state.player, Vec2::new(400.0, 400.0));
        assert_eq!(state.stars.len(), STAR_COUNT);
        assert_ne!(state.stars, stars);
    }

    #[test]
    fn test_behavior_table_is_pure() {
        let e = still(EnemyKind::Chaser, 100.0, 100.0);
        let s = Surroundings {
            player: Vec2::new(200.0, 100.0),
            projectiles: &[],
            world: Vec2::splat(800.0),
            speed: 1.0,
            evade_radius: EVADE_RADIUS,
        };
        let a = (EnemyKind::Chaser.behavior())(&e, &s);
        let b = (EnemyKind::Chaser.behavior())(&e, &s);
        assert_eq!(a, b);
        assert_eq!(a.pos, Vec2::new(101.0, 100.0));
    }

    proptest! {
        #[test]
        fn prop_everything_stays_in_world(
            seed in any::<u64>(),
            moves in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 1..400),
        ) {
            let mut state = SpaceState::new(SpaceConfig::arcade(300.0, 200.0), seed);
            let world = state.config.world;
            for (up, down, left, right, shoot) in moves {
                let fire = if shoot { vec![Vec2::new(1.0, 0.5)] } else { Vec::new() };
                state.tick(&SpaceInput { up, down, left, right, fire, restart: true });

                let half = state.config.player_size / 2.0;
                prop_assert!(state.player.x >= half && state.player.x <= world.x - half);
                prop_assert!(state.player.y >= half && state.player.y <= world.y - half);
                for e in &state.enemies {
                    prop_assert!(e.pos.x >= e.size / 2.0 && e.pos.x <= world.x - e.size / 2.0);
                    prop_assert!(e.pos.y >= e.size / 2.0 && e.pos.y <= world.y - e.size / 2.0);
                }
                for p in &state.projectiles {
                    prop_assert!(p.pos.x >= 0.0 && p.pos.x <= world.x);
                    prop_assert!(p.pos.y >= 0.0 && p.pos.y <= world.y);
                }
            }
        }
    }
}
