use std::collections::HashMap;

use crate::animation::descriptor::AnimationDescriptor;
use crate::foundation::error::LumyteResult;
use crate::scene::model::{ParamMap, SignDef};
use crate::timeline::functions;

/// A timeline function: `(sign, params, data, cycle) → descriptors`.
///
/// Pure. It is re-invoked once per cycle, so the returned content may
/// vary between loops (theme rotation keyed by the cycle index).
pub type TimelineFn =
    fn(&SignDef, &ParamMap, &ParamMap, u64) -> LumyteResult<Vec<AnimationDescriptor>>;

/// Name → timeline function lookup, fixed at startup.
#[derive(Clone)]
pub struct TimelineRegistry {
    map: HashMap<&'static str, TimelineFn>,
}

impl TimelineRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// The registry of built-in timeline functions.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("backdrop", functions::backdrop);
        registry.register("title", functions::title);
        registry
    }

    /// Register a timeline function under a name (replaces any previous
    /// entry with the same name).
    pub fn register(&mut self, name: &'static str, f: TimelineFn) {
        self.map.insert(name, f);
    }

    /// Look up a timeline function by name.
    pub fn get(&self, name: &str) -> Option<TimelineFn> {
        self.map.get(name).copied()
    }
}

impl Default for TimelineRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
