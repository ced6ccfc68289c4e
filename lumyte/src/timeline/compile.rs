use crate::animation::tween::TweenTrack;

/// The compiled movie: every tween track from every scene, flattened onto
/// one time axis and sorted into painter's order.
#[derive(Debug, Clone, Default)]
pub(crate) struct MasterTimeline {
    tracks: Vec<TweenTrack>,
    duration: f64,
}

impl MasterTimeline {
    /// Assemble a master timeline from compiled tracks.
    ///
    /// Tracks are stably sorted by ascending layer, so equal layers keep
    /// their screenplay order. Duration is the latest track end.
    pub(crate) fn new(mut tracks: Vec<TweenTrack>) -> Self {
        tracks.sort_by_key(|track| track.layer());
        let duration = tracks
            .iter()
            .map(|track| track.end())
            .fold(0.0_f64, f64::max);
        Self { tracks, duration }
    }

    /// Total duration in seconds (0 for an empty movie).
    pub(crate) fn duration(&self) -> f64 {
        self.duration
    }

    /// Update every track's tween state to time `t`.
    pub(crate) fn seek(&mut self, t: f64) {
        for track in &mut self.tracks {
            track.seek(t);
        }
    }

    /// Tracks in painter's order.
    pub(crate) fn tracks(&self) -> &[TweenTrack] {
        &self.tracks
    }
}
