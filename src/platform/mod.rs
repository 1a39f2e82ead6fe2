//! Platform abstraction layer
//!
//! Browser events are reduced to plain data here so the rest of the crate
//! never touches `web_sys` event types.

pub mod input;

pub use input::{InputState, Key};
