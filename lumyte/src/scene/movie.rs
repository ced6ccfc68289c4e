use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{LumyteError, LumyteResult};
use crate::scene::model::MovieDef;

/// A validated movie description.
///
/// Wraps a [`MovieDef`] whose static invariants have been checked once, so
/// downstream compilation can assume sane geometry and offsets. The inner
/// definition stays immutable for the lifetime of the wrapper; the player
/// deep-copies it on every compile.
#[derive(Debug, Clone)]
pub struct Movie {
    def: MovieDef,
}

impl Movie {
    /// Validate and wrap a movie definition.
    pub fn from_def(def: MovieDef) -> LumyteResult<Self> {
        validate(&def)?;
        Ok(Self { def })
    }

    /// Parse a movie from JSON text.
    pub fn from_json(json: &str) -> LumyteResult<Self> {
        let def: MovieDef = serde_json::from_str(json)
            .map_err(|e| LumyteError::validation(format!("movie json: {e}")))?;
        Self::from_def(def)
    }

    /// Load a movie from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> LumyteResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read movie '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// The validated definition.
    pub fn def(&self) -> &MovieDef {
        &self.def
    }
}

fn validate(def: &MovieDef) -> LumyteResult<()> {
    if def.sign.width == 0 || def.sign.height == 0 {
        return Err(LumyteError::validation("sign dimensions must be non-zero"));
    }
    if let Some(fps) = def.sign.fps {
        if fps == 0 {
            return Err(LumyteError::validation("sign fps override must be > 0"));
        }
    }
    for (i, entry) in def.screenplay.iter().enumerate() {
        if entry.timeline.is_empty() {
            return Err(LumyteError::validation(format!(
                "screenplay[{i}] names an empty timeline function"
            )));
        }
        if !entry.start.is_finite() || entry.start < 0.0 {
            return Err(LumyteError::validation(format!(
                "screenplay[{i}] start offset must be finite and >= 0"
            )));
        }
    }
    Ok(())
}
