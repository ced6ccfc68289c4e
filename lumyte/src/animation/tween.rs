use smallvec::SmallVec;

use crate::animation::descriptor::{AnimationDescriptor, AttrMap, AttrValue, DrawKind};
use crate::animation::ease::Ease;
use crate::foundation::error::LumyteResult;

/// One tween segment compiled from a keyframe.
///
/// `from` is the fully resolved attribute state at segment entry, so a
/// seek never depends on the order in which earlier seeks happened.
#[derive(Debug, Clone)]
struct TweenSegment {
    duration: f64,
    /// Cumulative end time of this segment in track-local seconds.
    end: f64,
    ease: Ease,
    from: AttrMap,
    to: AttrMap,
}

/// Compiled tween track for one animation descriptor.
///
/// Holds the immutable initial/final snapshots and a mutable interpolated
/// state that [`TweenTrack::seek`] keeps in sync with the playhead. The
/// descriptor itself is consumed at compile time and never mutated in
/// place, so reloading a movie always starts from pristine keyframes.
#[derive(Debug, Clone)]
pub(crate) struct TweenTrack {
    kind: DrawKind,
    layer: i32,
    /// Absolute start offset on the master timeline (scene + descriptor).
    start: f64,
    /// Sum of segment durations.
    total: f64,
    props: AttrMap,
    initial: AttrMap,
    terminal: AttrMap,
    segments: SmallVec<[TweenSegment; 4]>,
    state: AttrMap,
    active: bool,
}

impl TweenTrack {
    /// Compile a descriptor into a track anchored at `scene_start`.
    pub(crate) fn compile(
        descriptor: AnimationDescriptor,
        scene_start: f64,
    ) -> LumyteResult<Self> {
        descriptor.validate()?;

        let AnimationDescriptor {
            kind,
            layer,
            start,
            props,
            keyframes,
        } = descriptor;

        let mut iter = keyframes.into_iter();
        // validate() guarantees at least one keyframe. Its duration is
        // ignored: keyframe 0 is the initial state.
        let initial = iter.next().map(|kf| kf.values).unwrap_or_default();

        let mut segments = SmallVec::new();
        let mut acc = initial.clone();
        let mut end = 0.0;
        for kf in iter {
            let from = acc.clone();
            for (name, value) in &kf.values {
                acc.insert(name.clone(), value.clone());
            }
            end += kf.duration;
            segments.push(TweenSegment {
                duration: kf.duration,
                end,
                ease: kf.ease,
                from,
                to: kf.values,
            });
        }

        Ok(Self {
            kind,
            layer,
            start: scene_start + start,
            total: end,
            props,
            state: initial.clone(),
            terminal: acc,
            initial,
            segments,
            active: false,
        })
    }

    pub(crate) fn kind(&self) -> DrawKind {
        self.kind
    }

    pub(crate) fn layer(&self) -> i32 {
        self.layer
    }

    /// Track end offset on the master timeline.
    pub(crate) fn end(&self) -> f64 {
        self.start + self.total
    }

    /// Whether the playhead currently sits inside this track's span.
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn initial_state(&self) -> &AttrMap {
        &self.initial
    }

    /// Resolve an attribute: tween state first, then static props.
    pub(crate) fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.state.get(name).or_else(|| self.props.get(name))
    }

    /// Move the tween state to master-timeline time `t`.
    ///
    /// The active span is `[start, start + total]` inclusive at both ends:
    /// the exit toggle fires strictly past the end, so the final tick of a
    /// cycle still draws the track's terminal state.
    pub(crate) fn seek(&mut self, t: f64) {
        let local = t - self.start;
        if local < 0.0 {
            self.active = false;
            self.state.clone_from(&self.initial);
            return;
        }
        if local > self.total {
            self.active = false;
            self.state.clone_from(&self.terminal);
            return;
        }

        self.active = true;
        if self.segments.is_empty() {
            self.state.clone_from(&self.initial);
            return;
        }

        let idx = self
            .segments
            .iter()
            .position(|seg| local <= seg.end)
            .unwrap_or(self.segments.len() - 1);
        let seg = &self.segments[idx];

        let progress = if seg.duration > 0.0 {
            ((local - (seg.end - seg.duration)) / seg.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let eased = seg.ease.apply(progress);

        // Values untouched by this segment hold their entry state.
        for (name, value) in &seg.from {
            if !seg.to.contains_key(name) {
                assign(&mut self.state, name, value);
            }
        }
        for (name, target) in &seg.to {
            let value = match (seg.from.get(name), target) {
                (Some(AttrValue::Num(a)), AttrValue::Num(b)) => {
                    AttrValue::Num(a + (b - a) * eased)
                }
                // Text (and values introduced mid-track) snap once the
                // playhead moves past the segment entry; exactly at entry
                // the previous state still holds, so the state at t=0 is
                // keyframe 0 verbatim.
                (Some(prev), _) if progress <= 0.0 => prev.clone(),
                (None, _) if progress <= 0.0 => continue,
                _ => target.clone(),
            };
            assign(&mut self.state, name, &value);
        }
        // Keys introduced by later segments must not exist yet.
        let horizon = &seg.from;
        let to = &seg.to;
        self.state
            .retain(|name, _| horizon.contains_key(name) || to.contains_key(name));
    }
}

fn assign(state: &mut AttrMap, name: &str, value: &AttrValue) {
    match state.get_mut(name) {
        Some(slot) => {
            if slot != value {
                *slot = value.clone();
            }
        }
        None => {
            state.insert(name.to_owned(), value.clone());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
