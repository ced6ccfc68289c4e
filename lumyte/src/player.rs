//! The frame engine: compiles movies into tween tracks and renders one
//! BGRA raster per [`Player::play`] call.

use log::{debug, warn};

use crate::foundation::core::{Brightness, SignGeometry};
use crate::foundation::error::{LumyteError, LumyteResult};
use crate::render::canvas::Canvas;
use crate::render::draw::draw_track;
use crate::scene::model::MovieDef;
use crate::scene::movie::Movie;
use crate::timeline::compile::MasterTimeline;
use crate::timeline::registry::TimelineRegistry;

/// Outcome of one [`Player::play`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Played {
    /// `true` when this call crossed the end of the master timeline and
    /// wrapped back to frame 0 (the cycle counter was incremented).
    pub wrapped: bool,
}

/// Headless, deterministic renderer for one movie at a time.
///
/// `load` compiles the declarative description into a master timeline of
/// tween tracks; `play` advances one frame, seeks the timeline, and draws
/// every active track in painter's order onto the reusable canvas. The
/// loaded description is kept pristine: each compile (including the
/// per-cycle recompile on wrap) starts from a fresh deep copy, so tween
/// state can never leak back into the movie.
pub struct Player {
    registry: TimelineRegistry,
    movie: MovieDef,
    master: MasterTimeline,
    canvas: Canvas,
    brightness: Brightness,

    fps: u32,
    duration: f64,
    frames: u64,
    frame: u64,
    cycle: u64,
}

impl Player {
    /// Create a player showing `movie`.
    pub fn new(registry: TimelineRegistry, movie: &Movie) -> LumyteResult<Self> {
        let def = movie.def().clone();
        let geometry = SignGeometry::new(def.sign.width, def.sign.height)?;
        let fps = def.sign.effective_fps();
        let compiled = compile(&registry, &def, 0)?;

        let mut player = Self {
            registry,
            movie: def,
            canvas: Canvas::new(geometry),
            brightness: Brightness::MAX,
            fps,
            duration: 0.0,
            frames: 1,
            frame: 0,
            cycle: 0,
            master: MasterTimeline::default(),
        };
        player.install(compiled);
        Ok(player)
    }

    /// Compile and switch to a new movie.
    ///
    /// On any compile error (unknown timeline function, bad keyframes) the
    /// currently loaded movie stays active and untouched.
    pub fn load(&mut self, movie: &Movie) -> LumyteResult<()> {
        let def = movie.def().clone();
        let geometry = SignGeometry::new(def.sign.width, def.sign.height)?;
        let compiled = compile(&self.registry, &def, 0)?;

        if geometry != self.canvas.geometry() {
            self.canvas = Canvas::new(geometry);
        }
        self.fps = def.sign.effective_fps();
        self.movie = def;
        self.cycle = 0;
        self.install(compiled);
        Ok(())
    }

    /// Recompile the loaded movie from its pristine description, resetting
    /// the playhead and cycle counter.
    pub fn reload(&mut self) -> LumyteResult<()> {
        let compiled = compile(&self.registry, &self.movie, 0)?;
        self.cycle = 0;
        self.install(compiled);
        Ok(())
    }

    fn install(&mut self, master: MasterTimeline) {
        self.duration = master.duration();
        // Floor at one frame so an empty movie keeps play() well-defined.
        self.frames = ((self.duration * f64::from(self.fps)).ceil() as u64).max(1);
        self.frame = 0;
        self.master = master;
    }

    /// Render the next frame into the canvas.
    ///
    /// Frames on which no animation is active are skipped and retried (at
    /// most `frames` times, so an empty movie terminates), which
    /// suppresses all-blank frames between scenes. Crossing the end of the
    /// timeline wraps to frame 0, increments the cycle, and recompiles the
    /// movie, since timeline functions are invoked once per cycle and may vary
    /// their output.
    pub fn play(&mut self) -> LumyteResult<Played> {
        let mut wrapped = false;

        for _ in 0..=self.frames {
            let progress = self.frame as f64 / (self.frames.saturating_sub(1)).max(1) as f64;
            let t = self.duration * progress;

            self.master.seek(t);
            self.canvas.clear();

            let mut drew = false;
            for track in self.master.tracks() {
                if track.is_active() {
                    draw_track(&mut self.canvas, track, self.brightness)?;
                    drew = true;
                }
            }

            self.frame += 1;
            // At most one wrap per call: a blank retry walk that crosses
            // the end again just replays the recompiled timeline, so the
            // cycle counter stays in step with the reported wrap.
            if self.frame >= self.frames && !wrapped {
                self.frame = 0;
                self.cycle += 1;
                wrapped = true;
                debug!("movie wrapped; starting cycle {}", self.cycle);
                let compiled = compile(&self.registry, &self.movie, self.cycle)?;
                self.duration = compiled.duration();
                self.frames = ((self.duration * f64::from(self.fps)).ceil() as u64).max(1);
                self.master = compiled;
            } else if self.frame >= self.frames {
                self.frame = 0;
            }

            if drew {
                return Ok(Played { wrapped });
            }
        }

        warn!("no animation active anywhere in the movie; emitting blank frame");
        Ok(Played { wrapped })
    }

    /// The rendered canvas as a flat BGRA byte buffer of length W·H·4.
    pub fn image_data(&self) -> &[u8] {
        self.canvas.data()
    }

    /// Set the perceptual brightness used to compensate fill colors from
    /// the next frame on.
    pub fn set_brightness(&mut self, brightness: Brightness) {
        self.brightness = brightness;
    }

    /// Current perceptual brightness.
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Effective frame rate of the loaded movie.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frames per cycle of the loaded movie.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Completed cycle count since the movie was (re)loaded.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

fn compile(
    registry: &TimelineRegistry,
    def: &MovieDef,
    cycle: u64,
) -> LumyteResult<MasterTimeline> {
    use crate::animation::tween::TweenTrack;

    let mut tracks = Vec::new();
    for entry in &def.screenplay {
        let f = registry.get(&entry.timeline).ok_or_else(|| {
            LumyteError::timeline(format!("unknown timeline function \"{}\"", entry.timeline))
        })?;
        let descriptors = f(&def.sign, &entry.params, &def.data, cycle)?;
        for descriptor in descriptors {
            tracks.push(TweenTrack::compile(descriptor, entry.start)?);
        }
    }
    Ok(MasterTimeline::new(tracks))
}
