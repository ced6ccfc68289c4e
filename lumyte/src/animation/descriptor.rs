use std::collections::BTreeMap;

use crate::animation::ease::Ease;
use crate::foundation::error::{LumyteError, LumyteResult};

/// One attribute value in a props bag or tween state.
///
/// Numbers interpolate between keyframes; text snaps at segment entry.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Numeric attribute (positions, sizes, alpha, font size, ...).
    Num(f64),
    /// Textual attribute (fill color, text content, alignment tags, ...).
    Text(String),
}

impl AttrValue {
    /// Numeric view of this value.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Textual view of this value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Num(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        Self::Num(n)
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        Self::Num(f64::from(n))
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        Self::Num(f64::from(n))
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Attribute name → value bag.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// Drawable kind tag. Rectangle and text are the entire set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawKind {
    /// Filled rectangle.
    Rect,
    /// Filled text run.
    Text,
}

/// One keyframe: a duration and the attribute values reached at its end.
///
/// The first keyframe of a descriptor is the initial state; its duration
/// is ignored. Every following keyframe defines a tween segment from the
/// previous keyframe's values to its own.
#[derive(Debug, Clone)]
pub struct Keyframe {
    /// Segment length in seconds.
    pub duration: f64,
    /// Easing toward this keyframe's values.
    pub ease: Ease,
    /// Tweened attribute values at the end of the segment.
    pub values: AttrMap,
}

impl Keyframe {
    /// New keyframe with the given duration, linear ease, no values yet.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ease: Ease::Linear,
            values: AttrMap::new(),
        }
    }

    /// Set the easing toward this keyframe.
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Set one tweened attribute value.
    pub fn set(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.values.insert(name.to_owned(), value.into());
        self
    }
}

/// A drawable element produced by a timeline function.
#[derive(Debug, Clone)]
pub struct AnimationDescriptor {
    /// Drawable kind.
    pub kind: DrawKind,
    /// Painter's-order layer; lower layers draw first.
    pub layer: i32,
    /// Start offset in seconds within the enclosing scene.
    pub start: f64,
    /// Attributes that never change during the animation.
    pub props: AttrMap,
    /// Ordered keyframes; the first is the initial state.
    pub keyframes: Vec<Keyframe>,
}

impl AnimationDescriptor {
    /// New rectangle descriptor on the given layer.
    pub fn rect(layer: i32) -> Self {
        Self::new(DrawKind::Rect, layer)
    }

    /// New text descriptor on the given layer.
    pub fn text(layer: i32) -> Self {
        Self::new(DrawKind::Text, layer)
    }

    fn new(kind: DrawKind, layer: i32) -> Self {
        Self {
            kind,
            layer,
            start: 0.0,
            props: AttrMap::new(),
            keyframes: Vec::new(),
        }
    }

    /// Set the start offset within the scene.
    pub fn starting_at(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    /// Set one static prop.
    pub fn prop(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.props.insert(name.to_owned(), value.into());
        self
    }

    /// Append a keyframe.
    pub fn keyframe(mut self, keyframe: Keyframe) -> Self {
        self.keyframes.push(keyframe);
        self
    }

    /// Check static invariants before compilation.
    pub fn validate(&self) -> LumyteResult<()> {
        if self.keyframes.is_empty() {
            return Err(LumyteError::timeline(
                "animation descriptor needs at least one keyframe",
            ));
        }
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(LumyteError::timeline(
                "animation start offset must be finite and >= 0",
            ));
        }
        for (i, kf) in self.keyframes.iter().enumerate().skip(1) {
            if !kf.duration.is_finite() || kf.duration < 0.0 {
                return Err(LumyteError::timeline(format!(
                    "keyframe {i} duration must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}
