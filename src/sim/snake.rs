//! Snake on a square grid
//!
//! Food goes rotten after a while: eating it ends the round. Two configurations
//! ship: `classic` (one snake, rotting food spawns a fresh one) and `rivals`
//! (three AI snakes race the player for food).

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameEvent, GamePhase, RoundEnd};
use crate::consts::*;

/// Grid heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// One-cell step in grid space (y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// Dominant axis of a swipe, `None` for swipes shorter than `min_len`
    pub fn from_swipe(dx: f32, dy: f32, min_len: f32) -> Option<Self> {
        if dx.hypot(dy) < min_len {
            return None;
        }
        Some(if dx.abs() > dy.abs() {
            if dx > 0.0 { Direction::Right } else { Direction::Left }
        } else if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        })
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct SnakeInput {
    pub turn: Option<Direction>,
    pub restart: bool,
}

/// A food item
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub cell: IVec2,
    pub spawned_ms: f64,
    /// A fresh replacement was already spawned for this one going rotten
    pub replaced: bool,
}

impl Food {
    pub fn age(&self, now_ms: f64) -> f64 {
        now_ms - self.spawned_ms
    }

    pub fn is_rotten(&self, now_ms: f64, rot_ms: f64) -> bool {
        self.age(now_ms) > rot_ms
    }
}

/// Where an AI snake starts
#[derive(Debug, Clone)]
pub struct RivalSpawn {
    pub home: IVec2,
    pub vel: IVec2,
    pub color: &'static str,
}

/// AI-controlled snake that greedily chases the nearest food
#[derive(Debug, Clone)]
pub struct Rival {
    pub segments: VecDeque<IVec2>,
    pub vel: IVec2,
    pub color: &'static str,
    home: IVec2,
}

impl Rival {
    fn new(spawn: &RivalSpawn) -> Self {
        Self {
            segments: VecDeque::from([spawn.home]),
            vel: spawn.vel,
            color: spawn.color,
            home: spawn.home,
        }
    }

    pub fn head(&self) -> IVec2 {
        self.segments[0]
    }

    fn send_home(&mut self) {
        self.segments.clear();
        self.segments.push_back(self.home);
    }
}

#[derive(Debug, Clone)]
pub struct SnakeConfig {
    /// Board is `tile_count × tile_count` cells
    pub tile_count: i32,
    pub tile_size: f32,
    /// Canvas size in pixels; the board is sized from its width
    pub canvas: Vec2,
    pub tick_ms: f64,
    pub start: IVec2,
    pub rot_ms: f64,
    pub expire_ms: f64,
    pub grace_ms: f64,
    /// Spawn an extra fresh food the moment one goes rotten
    pub spawn_on_rot: bool,
    pub rivals: Vec<RivalSpawn>,
}

impl SnakeConfig {
    /// Single snake; rotting food spawns a fresh one
    pub fn classic(canvas_width: f32, canvas_height: f32) -> Self {
        let tile_count = ((canvas_width / TILE_SIZE) as i32).max(2);
        Self {
            tile_count,
            tile_size: TILE_SIZE,
            canvas: Vec2::new(canvas_width, canvas_height),
            tick_ms: SNAKE_TICK_MS,
            start: IVec2::splat(tile_count / 2),
            rot_ms: FOOD_ROT_MS,
            expire_ms: FOOD_EXPIRE_MS,
            grace_ms: SNAKE_GRACE_MS,
            spawn_on_rot: true,
            rivals: Vec::new(),
        }
    }

    /// Player plus three AI snakes starting in the corners
    pub fn rivals(canvas_width: f32, canvas_height: f32) -> Self {
        let mut config = Self::classic(canvas_width, canvas_height);
        let last = config.tile_count - 1;
        config.spawn_on_rot = false;
        config.rivals = vec![
            RivalSpawn {
                home: IVec2::new(0, 0),
                vel: IVec2::new(1, 0),
                color: "cyan",
            },
            RivalSpawn {
                home: IVec2::new(last, 0),
                vel: IVec2::new(-1, 0),
                color: "magenta",
            },
            RivalSpawn {
                home: IVec2::new(0, last),
                vel: IVec2::new(0, -1),
                color: "orange",
            },
        ];
        config
    }
}

/// Complete snake game state
#[derive(Debug, Clone)]
pub struct SnakeState {
    pub config: SnakeConfig,
    /// Player body, head first
    pub snake: VecDeque<IVec2>,
    /// Zero until the first turn
    pub vel: IVec2,
    pub foods: Vec<Food>,
    pub rivals: Vec<Rival>,
    pub score: u64,
    pub phase: GamePhase,
    pub end_reason: Option<RoundEnd>,
    /// Simulated time since the state was built
    pub clock_ms: f64,
    /// Clock value when the current round started moving
    pub round_start_ms: f64,
    pending_growth: u32,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl SnakeState {
    pub fn new(config: SnakeConfig, seed: u64) -> Self {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(config: SnakeConfig, rng: Pcg32) -> Self {
        let rivals = config.rivals.iter().map(Rival::new).collect();
        let mut state = Self {
            snake: VecDeque::from([config.start]),
            vel: IVec2::ZERO,
            foods: Vec::new(),
            rivals,
            score: 0,
            phase: GamePhase::Ready,
            end_reason: None,
            clock_ms: 0.0,
            round_start_ms: 0.0,
            pending_growth: 0,
            rng,
            events: Vec::new(),
            config,
        };
        let food = state.fresh_food();
        state.foods.push(food);
        state
    }

    /// Growth earned by meals but not yet added to the body
    pub fn pending_growth(&self) -> u32 {
        self.pending_growth
    }

    pub fn head(&self) -> IVec2 {
        self.snake[0]
    }

    pub fn in_grid(&self, cell: IVec2) -> bool {
        let n = self.config.tile_count;
        cell.x >= 0 && cell.y >= 0 && cell.x < n && cell.y < n
    }

    /// Wall and self collisions are ignored while this is true
    pub fn is_shielded(&self) -> bool {
        self.clock_ms - self.round_start_ms < self.config.grace_ms
    }

    pub fn is_rotten(&self, food: &Food) -> bool {
        food.is_rotten(self.clock_ms, self.config.rot_ms)
    }

    /// Apply a turn. Rejected when the snake already moves along that axis.
    pub fn steer(&mut self, dir: Direction) -> bool {
        let d = dir.delta();
        let allowed = if d.x != 0 { self.vel.x == 0 } else { self.vel.y == 0 };
        if !allowed {
            return false;
        }
        self.vel = d;
        if self.phase == GamePhase::Ready {
            self.begin_round();
        }
        true
    }

    fn begin_round(&mut self) {
        self.phase = GamePhase::Playing;
        self.round_start_ms = self.clock_ms;
        self.foods.clear();
        let food = self.fresh_food();
        self.foods.push(food);
        for rival in &mut self.rivals {
            rival.send_home();
        }
        self.events.push(GameEvent::Started);
        log::info!("Snake round started");
    }

    fn end_round(&mut self, reason: RoundEnd) {
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(reason);
        self.events.push(GameEvent::RoundOver {
            score: self.score,
            reason,
        });
        log::info!("Snake round over ({:?}), score {}", reason, self.score);
    }

    /// Food spawned now on a random free cell
    fn fresh_food(&mut self) -> Food {
        let n = self.config.tile_count;
        let occupied = |c: IVec2| {
            self.snake.contains(&c)
                || self.foods.iter().any(|f| f.cell == c)
                || self.rivals.iter().any(|r| r.segments.contains(&c))
        };
        let free: Vec<IVec2> = (0..n)
            .flat_map(|y| (0..n).map(move |x| IVec2::new(x, y)))
            .filter(|&c| !occupied(c))
            .collect();

        let cell = if free.is_empty() {
            IVec2::new(self.rng.random_range(0..n), self.rng.random_range(0..n))
        } else {
            free[self.rng.random_range(0..free.len())]
        };
        Food {
            cell,
            spawned_ms: self.clock_ms,
            replaced: false,
        }
    }

    /// Rot replacements, expiry cleanup, and never an empty board
    fn upkeep_food(&mut self) {
        let now = self.clock_ms;
        if self.config.spawn_on_rot {
            let rot_ms = self.config.rot_ms;
            let mut due = 0;
            for food in self.foods.iter_mut() {
                if food.is_rotten(now, rot_ms) && !food.replaced {
                    food.replaced = true;
                    due += 1;
                }
            }
            for _ in 0..due {
                let food = self.fresh_food();
                self.foods.push(food);
            }
        }

        let expire_ms = self.config.expire_ms;
        self.foods.retain(|f| f.age(now) <= expire_ms);
        if self.foods.is_empty() {
            let food = self.fresh_food();
            self.foods.push(food);
        }
    }

    fn advance_player(&mut self) {
        if self.vel == IVec2::ZERO {
            return;
        }

        let shielded = self.is_shielded();
        let mut head = self.head() + self.vel;

        if !self.in_grid(head) {
            if !shielded {
                self.end_round(RoundEnd::HitWall);
                return;
            }
            head = head.rem_euclid(IVec2::splat(self.config.tile_count));
        }
        if !shielded && self.snake.contains(&head) {
            self.end_round(RoundEnd::HitSelf);
            return;
        }

        let eaten = self.foods.iter().position(|f| f.cell == head);
        if let Some(i) = eaten {
            if self.is_rotten(&self.foods[i]) {
                self.end_round(RoundEnd::AteRotten);
                return;
            }
        }

        self.snake.push_front(head);
        // Growth from an earlier meal keeps the tail this tick
        if self.pending_growth > 0 {
            self.pending_growth -= 1;
        } else {
            self.snake.pop_back();
        }

        if let Some(i) = eaten {
            self.score += 1;
            self.pending_growth += 1;
            self.foods.remove(i);
            let food = self.fresh_food();
            self.foods.insert(i, food);
            self.events.push(GameEvent::Scored { score: self.score });
        }
    }

    fn advance_rivals(&mut self) {
        let now = self.clock_ms;
        let rot_ms = self.config.rot_ms;

        for r in 0..self.rivals.len() {
            let head = self.rivals[r].head();
            let target = self
                .foods
                .iter()
                .map(|f| f.cell)
                .min_by(|a, b| {
                    let da = (*a - head).as_vec2().length();
                    let db = (*b - head).as_vec2().length();
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                });
            let Some(target) = target else { continue };

            let d = target - head;
            let mut vel = if d.x.abs() > d.y.abs() {
                IVec2::new(if d.x > 0 { 1 } else { -1 }, 0)
            } else {
                IVec2::new(0, if d.y > 0 { 1 } else { -1 })
            };
            if !self.in_grid(head + vel) {
                vel = -vel;
            }

            let new_head = head + vel;
            let rival = &mut self.rivals[r];
            rival.vel = vel;
            rival.segments.push_front(new_head);

            let eaten = self
                .foods
                .iter()
                .position(|f| f.cell == new_head && !f.is_rotten(now, rot_ms));
            match eaten {
                Some(i) => {
                    self.foods.remove(i);
                    let food = self.fresh_food();
                    self.foods.insert(i, food);
                }
                None => {
                    self.rivals[r].segments.pop_back();
                }
            }
        }
    }
}

impl Game for SnakeState {
    type Input = SnakeInput;

    fn tick_ms(&self) -> f64 {
        self.config.tick_ms
    }

    fn tick(&mut self, input: &SnakeInput) {
        if self.phase == GamePhase::GameOver {
            if input.restart {
                self.restart();
            }
            return;
        }

        self.clock_ms += self.config.tick_ms;

        if let Some(dir) = input.turn {
            self.steer(dir);
        }

        self.upkeep_food();

        if self.phase == GamePhase::Playing {
            self.advance_player();
        }
        if self.phase != GamePhase::GameOver {
            self.advance_rivals();
        }
    }

    fn restart(&mut self) {
        let rng = self.rng.clone();
        *self = Self::with_rng(self.config.clone(), rng);
        self.events.push(GameEvent::Restarted);
        log::info!("Snake restarted");
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
