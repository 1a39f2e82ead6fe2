//! Rendering module
//!
//! `scene` builds draw commands from game state and runs everywhere;
//! `canvas2d` replays them on an HTML canvas.

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::CanvasRenderer;
pub use scene::{DrawCmd, Hud};
