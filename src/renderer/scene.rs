//! Scene building for the canvas games
//!
//! Each game state is turned into a flat list of [`DrawCmd`]s in canvas
//! coordinates. Nothing here touches the DOM or mutates state.

use glam::Vec2;

use crate::sim::{DodgeState, EnemyKind, GamePhase, Rect, RoundEnd, SnakeState, SpaceState};

const SCORE_FONT: &str = "16px sans-serif";
const HINT_FONT: &str = "24px sans-serif";
const TITLE_FONT: &str = "40px sans-serif";
const DETAIL_FONT: &str = "20px sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// A single canvas drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Fill the whole canvas
    Fill { color: &'static str },
    Rect { rect: Rect, color: &'static str },
    Circle { center: Vec2, radius: f32, color: &'static str },
    Triangle { points: [Vec2; 3], color: &'static str },
    Text {
        text: String,
        pos: Vec2,
        font: &'static str,
        color: &'static str,
        align: Align,
    },
}

/// Page-level values drawn on top of every game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub high_score: u64,
    /// Red flash behind the game-over panel
    pub flash: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            high_score: 0,
            flash: true,
        }
    }
}

fn text(cmds: &mut Vec<DrawCmd>, text: String, pos: Vec2, font: &'static str, align: Align) {
    cmds.push(DrawCmd::Text {
        text,
        pos,
        font,
        color: "#fff",
        align,
    });
}

fn score_lines(cmds: &mut Vec<DrawCmd>, score: u64, hud: &Hud, viewport: Vec2) {
    text(
        cmds,
        format!("Score: {score}"),
        Vec2::new(10.0, viewport.y - 10.0),
        SCORE_FONT,
        Align::Left,
    );
    text(
        cmds,
        format!("High Score: {}", hud.high_score),
        Vec2::new(10.0, 20.0),
        SCORE_FONT,
        Align::Left,
    );
}

fn start_hint(cmds: &mut Vec<DrawCmd>, hint: &str, viewport: Vec2) {
    text(cmds, hint.to_string(), viewport / 2.0, HINT_FONT, Align::Center);
}

/// Dimmed panel with the round result and how to play again
fn game_over_overlay(
    cmds: &mut Vec<DrawCmd>,
    reason: Option<RoundEnd>,
    score: u64,
    hud: &Hud,
    viewport: Vec2,
) {
    let full = Rect::new(0.0, 0.0, viewport.x, viewport.y);
    if hud.flash {
        cmds.push(DrawCmd::Rect {
            rect: full,
            color: "rgba(255,0,0,0.35)",
        });
    }
    cmds.push(DrawCmd::Rect {
        rect: full,
        color: "rgba(0,0,0,0.55)",
    });
    let center = viewport / 2.0;
    let title = reason.map_or("Game Over", |r| r.message());
    text(cmds, title.to_string(), center - Vec2::new(0.0, 20.0), TITLE_FONT, Align::Center);
    text(
        cmds,
        format!("Score: {score}"),
        center + Vec2::new(0.0, 20.0),
        DETAIL_FONT,
        Align::Center,
    );
    text(
        cmds,
        "Press Enter or tap to play again".to_string(),
        center + Vec2::new(0.0, 50.0),
        SCORE_FONT,
        Align::Center,
    );
}

pub fn snake_scene(state: &SnakeState, hud: &Hud) -> Vec<DrawCmd> {
    let ts = state.config.tile_size;
    let viewport = state.config.canvas;
    let cell = |c: glam::IVec2| Rect::new(c.x as f32 * ts, c.y as f32 * ts, ts, ts);

    let mut cmds = vec![DrawCmd::Fill { color: "#222" }];
    for food in &state.foods {
        let color = if state.is_rotten(food) { "white" } else { "red" };
        cmds.push(DrawCmd::Rect {
            rect: cell(food.cell),
            color,
        });
    }
    for &seg in &state.snake {
        cmds.push(DrawCmd::Rect {
            rect: cell(seg),
            color: "lime",
        });
    }
    for rival in &state.rivals {
        for &seg in &rival.segments {
            cmds.push(DrawCmd::Rect {
                rect: cell(seg),
                color: rival.color,
            });
        }
    }
    score_lines(&mut cmds, state.score, hud, viewport);

    match state.phase {
        GamePhase::Ready => start_hint(&mut cmds, "Press an arrow key or swipe", viewport),
        GamePhase::GameOver => {
            game_over_overlay(&mut cmds, state.end_reason, state.score, hud, viewport)
        }
        GamePhase::Playing => {}
    }
    cmds
}

pub fn dodge_scene(state: &DodgeState, hud: &Hud) -> Vec<DrawCmd> {
    let viewport = state.config.bounds();
    let mut cmds = vec![DrawCmd::Fill { color: "#111" }];
    cmds.push(DrawCmd::Rect {
        rect: state.player,
        color: "lime",
    });
    cmds.extend(state.blocks.iter().map(|b| DrawCmd::Rect {
        rect: b.rect,
        color: "red",
    }));
    score_lines(&mut cmds, state.score, hud, viewport);
    if state.phase == GamePhase::GameOver {
        game_over_overlay(&mut cmds, state.end_reason, state.score, hud, viewport);
    }
    cmds
}

fn on_screen(p: Vec2, viewport: Vec2) -> bool {
    p.x >= 0.0 && p.x < viewport.x && p.y >= 0.0 && p.y < viewport.y
}

pub fn space_scene(state: &SpaceState, hud: &Hud) -> Vec<DrawCmd> {
    let viewport = state.config.viewport;
    let offset = state.camera_offset();
    let mut cmds = vec![DrawCmd::Fill { color: "black" }];

    for &star in &state.stars {
        let s = star - offset;
        if on_screen(s, viewport) {
            cmds.push(DrawCmd::Rect {
                rect: Rect::new(s.x, s.y, 1.0, 1.0),
                color: "white",
            });
        }
    }

    cmds.push(DrawCmd::Rect {
        rect: Rect::centered(state.player - offset, state.config.player_size),
        color: "green",
    });

    for p in &state.projectiles {
        cmds.push(DrawCmd::Rect {
            rect: Rect::centered(p.pos - offset, 4.0),
            color: "white",
        });
    }

    for e in &state.enemies {
        let s = e.pos - offset;
        let half = e.size / 2.0;
        let color = e.kind.color();
        cmds.push(match e.kind {
            EnemyKind::Patrol => DrawCmd::Triangle {
                points: [
                    s + Vec2::new(0.0, -half),
                    s + Vec2::new(-half, half),
                    s + Vec2::new(half, half),
                ],
                color,
            },
            EnemyKind::Chaser | EnemyKind::Evader => DrawCmd::Rect {
                rect: Rect::centered(s, e.size),
                color,
            },
        });
    }

    for x in &state.explosions {
        let s = x.pos - offset;
        cmds.push(DrawCmd::Circle {
            center: s,
            radius: x.size * 1.5,
            color: "orange",
        });
        cmds.push(DrawCmd::Circle {
            center: s,
            radius: x.size,
            color: "red",
        });
    }

    score_lines(&mut cmds, state.score, hud, viewport);
    match state.phase {
        GamePhase::Ready => start_hint(&mut cmds, "Press WASD to start", viewport),
        GamePhase::GameOver => {
            game_over_overlay(&mut cmds, state.end_reason, state.score, hud, viewport)
        }
        GamePhase::Playing => {}
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::snake::Food;
    use crate::sim::space::Enemy;
    use crate::sim::{DodgeConfig, SnakeConfig, SpaceConfig};
    use glam::IVec2;

    fn texts(cmds: &[DrawCmd]) -> Vec<&str> {
        cmds.iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn color_at(cmds: &[DrawCmd], rect: Rect) -> Option<&'static str> {
        cmds.iter().find_map(|c| match c {
            DrawCmd::Rect { rect: r, color } if *r == rect => Some(*color),
            _ => None,
        })
    }

    #[test]
    fn test_rotten_food_is_white() {
        let mut state = SnakeState::new(SnakeConfig::classic(400.0, 400.0), 5);
        state.clock_ms = 10_000.0;
        state.foods = vec![
            Food {
                cell: IVec2::new(1, 1),
                spawned_ms: 9_000.0,
                replaced: false,
            },
            Food {
                cell: IVec2::new(2, 2),
                spawned_ms: 1_000.0,
                replaced: true,
            },
        ];
        let cmds = snake_scene(&state, &Hud::default());
        assert_eq!(color_at(&cmds, Rect::new(20.0, 20.0, 20.0, 20.0)), Some("red"));
        assert_eq!(color_at(&cmds, Rect::new(40.0, 40.0, 20.0, 20.0)), Some("white"));
    }

    #[test]
    fn test_overlay_only_after_game_over() {
        let mut state = SnakeState::new(SnakeConfig::classic(400.0, 400.0), 5);
        let hud = Hud {
            high_score: 12,
            flash: true,
        };
        let ready = snake_scene(&state, &hud);
        assert!(texts(&ready).contains(&"Press an arrow key or swipe"));
        assert!(texts(&ready).contains(&"High Score: 12"));

        state.phase = GamePhase::GameOver;
        state.end_reason = Some(RoundEnd::AteRotten);
        let over = snake_scene(&state, &hud);
        let lines = texts(&over);
        assert!(lines.contains(&"Oh no, you ate rotten food!"));
        assert!(lines.contains(&"Press Enter or tap to play again"));
        assert!(over.contains(&DrawCmd::Rect {
            rect: Rect::new(0.0, 0.0, 400.0, 400.0),
            color: "rgba(255,0,0,0.35)",
        }));
    }

    #[test]
    fn test_snake_hud_follows_canvas_height() {
        let mut state = SnakeState::new(SnakeConfig::classic(400.0, 300.0), 5);
        state.score = 3;
        let cmds = snake_scene(&state, &Hud::default());
        assert!(cmds.contains(&DrawCmd::Text {
            text: "Score: 3".to_string(),
            pos: Vec2::new(10.0, 290.0),
            font: SCORE_FONT,
            color: "#fff",
            align: Align::Left,
        }));

        state.phase = GamePhase::GameOver;
        let over = snake_scene(&state, &Hud::default());
        assert!(over.contains(&DrawCmd::Rect {
            rect: Rect::new(0.0, 0.0, 400.0, 300.0),
            color: "rgba(0,0,0,0.55)",
        }));
    }

    #[test]
    fn test_reduced_motion_skips_flash() {
        let mut state = DodgeState::new(DodgeConfig::crush(400.0, 400.0), 5);
        state.phase = GamePhase::GameOver;
        let hud = Hud {
            high_score: 0,
            flash: false,
        };
        let cmds = dodge_scene(&state, &hud);
        assert!(!cmds.iter().any(|c| matches!(
            c,
            DrawCmd::Rect { color: "rgba(255,0,0,0.35)", .. }
        )));
        assert!(texts(&cmds).contains(&"Game Over"));
    }

    #[test]
    fn test_dodge_draws_player_and_blocks() {
        let state = DodgeState::new(DodgeConfig::dodge(400.0, 400.0), 5);
        let cmds = dodge_scene(&state, &Hud::default());
        assert_eq!(cmds[0], DrawCmd::Fill { color: "#111" });
        assert_eq!(color_at(&cmds, state.player), Some("lime"));
        assert!(texts(&cmds).contains(&"Score: 0"));
    }

    #[test]
    fn test_space_camera_and_star_culling() {
        let mut state = SpaceState::new(SpaceConfig::arcade(400.0, 400.0), 5);
        state.enemies.push(Enemy {
            pos: Vec2::new(500.0, 300.0),
            vel: Vec2::ZERO,
            kind: EnemyKind::Chaser,
            size: 20.0,
        });
        let cmds = space_scene(&state, &Hud::default());

        // Camera offset is (200, 200) with the player at the world centre
        assert_eq!(color_at(&cmds, Rect::new(290.0, 90.0, 20.0, 20.0)), Some("yellow"));
        assert_eq!(color_at(&cmds, Rect::new(190.0, 190.0, 20.0, 20.0)), Some("green"));

        let stars: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Rect { rect, color: "white" } if rect.size == Vec2::ONE => Some(rect.pos),
                _ => None,
            })
            .collect();
        assert!(stars.len() <= crate::consts::STAR_COUNT);
        assert!(stars.iter().all(|&p| on_screen(p, Vec2::splat(400.0))));
        assert!(texts(&cmds).contains(&"Press WASD to start"));
    }
}
