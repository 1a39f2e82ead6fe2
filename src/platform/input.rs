//! Input mapping
//!
//! Listeners write raw key/pointer/touch facts into [`InputState`]; once per
//! tick the session asks it for the per-game input struct.

use std::collections::{HashSet, VecDeque};

use glam::Vec2;

use crate::consts::SWIPE_THRESHOLD;
use crate::sim::{Direction, DodgeInput, SnakeInput, SpaceInput};

/// Turns buffered ahead of the snake (fast double taps)
const MAX_QUEUED_TURNS: usize = 2;

/// Keys the games care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    Enter,
    Space,
}

impl Key {
    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "w" | "W" => Key::W,
            "a" | "A" => Key::A,
            "s" | "S" => Key::S,
            "d" | "D" => Key::D,
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            _ => return None,
        })
    }

    pub fn arrow(self) -> Option<Direction> {
        match self {
            Key::ArrowUp => Some(Direction::Up),
            Key::ArrowDown => Some(Direction::Down),
            Key::ArrowLeft => Some(Direction::Left),
            Key::ArrowRight => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn wasd(self) -> Option<Direction> {
        match self {
            Key::W => Some(Direction::Up),
            Key::S => Some(Direction::Down),
            Key::A => Some(Direction::Left),
            Key::D => Some(Direction::Right),
            _ => None,
        }
    }

    /// Keys whose browser default (scrolling) should be suppressed
    pub fn scrolls_page(self) -> bool {
        self.arrow().is_some() || self == Key::Space
    }
}

fn direction_vec(dir: Direction) -> Vec2 {
    dir.delta().as_vec2()
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    /// Latest horizontal press (arrows or A/D), wins while both are held
    last_horizontal: Option<Direction>,
    turns: VecDeque<Direction>,
    /// Arrow presses since the last tick (space shots)
    arrow_shots: Vec<Direction>,
    /// Clicks and taps in canvas coordinates
    clicks: Vec<Vec2>,
    restart: bool,
    swipe_start: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        let fresh = self.held.insert(key);
        if key == Key::Enter || key == Key::Space {
            self.restart = true;
        }
        if !fresh {
            // Auto-repeat
            return;
        }
        if let Some(dir) = key.arrow() {
            self.queue_turn(dir);
            self.arrow_shots.push(dir);
        }
        if let Some(dir) = key.arrow().or(key.wasd()) {
            if matches!(dir, Direction::Left | Direction::Right) {
                self.last_horizontal = Some(dir);
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn click(&mut self, at: Vec2) {
        self.clicks.push(at);
    }

    pub fn touch_start(&mut self, at: Vec2) {
        self.swipe_start = Some(at);
    }

    /// A long enough swipe turns the snake, anything shorter is a tap
    pub fn touch_end(&mut self, at: Vec2) {
        let Some(start) = self.swipe_start.take() else {
            return;
        };
        let d = at - start;
        match Direction::from_swipe(d.x, d.y, SWIPE_THRESHOLD) {
            Some(dir) => self.queue_turn(dir),
            None => self.clicks.push(at),
        }
    }

    /// Drop everything, e.g. when the page loses focus
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    fn queue_turn(&mut self, dir: Direction) {
        if self.turns.len() < MAX_QUEUED_TURNS {
            self.turns.push_back(dir);
        }
    }

    fn holding(&self, dir: Direction) -> bool {
        self.held
            .iter()
            .any(|k| k.arrow() == Some(dir) || k.wasd() == Some(dir))
    }

    fn wants_restart(&self) -> bool {
        self.restart || !self.clicks.is_empty()
    }

    /// Pops at most one queued turn
    pub fn snake_input(&mut self) -> SnakeInput {
        SnakeInput {
            turn: self.turns.pop_front(),
            restart: self.wants_restart(),
        }
    }

    pub fn dodge_input(&self) -> DodgeInput {
        let left = self.holding(Direction::Left);
        let right = self.holding(Direction::Right);
        let (left, right) = match (left, right) {
            (true, true) => (
                self.last_horizontal == Some(Direction::Left),
                self.last_horizontal == Some(Direction::Right),
            ),
            other => other,
        };
        DodgeInput {
            left,
            right,
            up: self.holding(Direction::Up),
            down: self.holding(Direction::Down),
            restart: self.wants_restart(),
        }
    }

    /// `aim` turns a click position into a world-space direction
    pub fn space_input(&self, aim: impl Fn(Vec2) -> Vec2) -> SpaceInput {
        let fire = self
            .arrow_shots
            .iter()
            .map(|&d| direction_vec(d))
            .chain(self.clicks.iter().map(|&p| aim(p)))
            .collect();
        SpaceInput {
            up: self.is_held(Key::W),
            down: self.is_held(Key::S),
            left: self.is_held(Key::A),
            right: self.is_held(Key::D),
            fire,
            restart: self.wants_restart(),
        }
    }

    /// Forget one-shot actions once a tick has seen them
    pub fn clear_one_shots(&mut self) {
        self.restart = false;
        self.arrow_shots.clear();
        self.clicks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_key("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_key("W"), Some(Key::W));
        assert_eq!(Key::from_key(" "), Some(Key::Space));
        assert_eq!(Key::from_key("q"), None);
        assert!(Key::ArrowDown.scrolls_page());
        assert!(!Key::D.scrolls_page());
    }

    #[test]
    fn test_turns_are_queued_once_per_press() {
        let mut input = InputState::new();
        input.key_down(Key::ArrowUp);
        input.key_down(Key::ArrowUp);
        input.key_down(Key::ArrowLeft);
        input.key_down(Key::ArrowDown);

        assert_eq!(input.snake_input().turn, Some(Direction::Up));
        assert_eq!(input.snake_input().turn, Some(Direction::Left));
        assert_eq!(input.snake_input().turn, None);
    }

    #[test]
    fn test_swipe_threshold() {
        let mut input = InputState::new();
        input.touch_start(Vec2::new(100.0, 100.0));
        input.touch_end(Vec2::new(110.0, 105.0));
        assert_eq!(input.snake_input().turn, None);
        // Short touch counts as a tap
        assert!(input.snake_input().restart);
        input.clear_one_shots();

        input.touch_start(Vec2::new(100.0, 100.0));
        input.touch_end(Vec2::new(95.0, 160.0));
        let snake = input.snake_input();
        assert_eq!(snake.turn, Some(Direction::Down));
        assert!(!snake.restart);
    }

    #[test]
    fn test_latest_horizontal_wins() {
        let mut input = InputState::new();
        input.key_down(Key::ArrowLeft);
        input.key_down(Key::ArrowRight);
        let dodge = input.dodge_input();
        assert!(dodge.right && !dodge.left);

        input.key_up(Key::ArrowRight);
        let dodge = input.dodge_input();
        assert!(dodge.left && !dodge.right);
    }

    #[test]
    fn test_wasd_mirrors_arrows_for_dodge() {
        let mut input = InputState::new();
        input.key_down(Key::W);
        input.key_down(Key::D);
        let dodge = input.dodge_input();
        assert!(dodge.up && dodge.right);
        assert!(!dodge.down && !dodge.left);
    }

    #[test]
    fn test_space_moves_with_wasd_and_fires_with_arrows() {
        let mut input = InputState::new();
        input.key_down(Key::ArrowUp);
        input.key_down(Key::A);
        input.click(Vec2::new(30.0, 40.0));

        let space = input.space_input(|p| p - Vec2::new(10.0, 10.0));
        assert!(space.left && !space.up);
        assert_eq!(space.fire, vec![Vec2::new(0.0, -1.0), Vec2::new(20.0, 30.0)]);

        input.clear_one_shots();
        let space = input.space_input(|p| p);
        assert!(space.fire.is_empty());
        assert!(space.left);
        assert!(!space.restart);
    }

    #[test]
    fn test_enter_requests_restart() {
        let mut input = InputState::new();
        input.key_down(Key::Enter);
        assert!(input.dodge_input().restart);
        input.clear_one_shots();
        assert!(!input.dodge_input().restart);
    }
}
