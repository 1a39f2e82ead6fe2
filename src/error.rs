//! Error types shared by the shell, storage and widgets
//!
//! Gameplay never errors: a lost round is a `GamePhase::GameOver`, not an `Err`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("missing page element `{0}`")]
    MissingElement(&'static str),
    #[error("unknown game `{0}`")]
    UnknownGame(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("request failed: {0}")]
    Fetch(String),
    #[error("unexpected HTTP status {status}")]
    Http { status: u16 },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("javascript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, ArcadeError>;

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for ArcadeError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        ArcadeError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<ArcadeError> for wasm_bindgen::JsValue {
    fn from(err: ArcadeError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
