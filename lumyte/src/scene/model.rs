use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::core::DEFAULT_FPS;

/// Opaque key/value bag handed to timeline functions (screenplay `params`
/// and the movie-level `data` bag share this shape).
pub type ParamMap = BTreeMap<String, serde_json::Value>;

/// Declarative movie description.
///
/// A movie is pure data: sign metadata, an opaque data bag, and an ordered
/// screenplay of timeline-function invocations. Compilation into tween
/// tracks happens in [`crate::player::Player::load`], which deep-copies
/// this description first, so the description itself is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDef {
    /// Sign metadata (dimensions, theme, optional fps override).
    pub sign: SignDef,
    /// Opaque values passed through to every timeline function.
    #[serde(default)]
    pub data: ParamMap,
    /// Ordered scene list.
    pub screenplay: Vec<ScreenplayEntryDef>,
}

/// Sign metadata carried by a movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignDef {
    /// Sign width in pixels.
    pub width: u32,
    /// Sign height in pixels.
    pub height: u32,
    /// Theme tag consulted by timeline functions for palette selection.
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Frames-per-second override; `None` uses the sign default (240).
    #[serde(default)]
    pub fps: Option<u32>,
}

impl SignDef {
    /// Effective frame rate for this movie.
    pub fn effective_fps(&self) -> u32 {
        self.fps.unwrap_or(DEFAULT_FPS)
    }
}

fn default_theme() -> String {
    "plasma".to_owned()
}

/// One scene: a timeline function invoked at a start offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenplayEntryDef {
    /// Registered name of the timeline function to invoke.
    pub timeline: String,
    /// Scene start offset in seconds from the beginning of the movie.
    #[serde(default)]
    pub start: f64,
    /// Static parameters for the timeline function.
    #[serde(default)]
    pub params: ParamMap,
}
