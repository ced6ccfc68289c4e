//! Built-in timeline functions and the default movie.

use std::collections::BTreeMap;

use crate::animation::descriptor::{AnimationDescriptor, Keyframe};
use crate::animation::ease::Ease;
use crate::foundation::error::LumyteResult;
use crate::scene::model::{MovieDef, ParamMap, ScreenplayEntryDef, SignDef};
use crate::scene::movie::Movie;

/// Theme palettes consulted by built-in timeline functions. The cycle
/// index rotates through the palette, so each loop of the movie shifts
/// color.
fn palette(theme: &str) -> &'static [&'static str] {
    match theme {
        "ember" => &["#ff6b35", "#f7c59f", "#efefd0", "#ff9f1c"],
        "tide" => &["#00a8e8", "#007ea7", "#80ced7", "#9ad1d4"],
        // "plasma" and anything unrecognized.
        _ => &["#ff5d8f", "#ffca3a", "#8ac926", "#1982c4"],
    }
}

fn cycle_color(theme: &str, cycle: u64) -> &'static str {
    let colors = palette(theme);
    colors[(cycle as usize) % colors.len()]
}

fn param_f64(params: &ParamMap, name: &str, default: f64) -> f64 {
    params.get(name).and_then(|v| v.as_f64()).unwrap_or(default)
}

fn param_str<'p>(params: &'p ParamMap, name: &str, default: &'p str) -> &'p str {
    params.get(name).and_then(|v| v.as_str()).unwrap_or(default)
}

/// Full-sign rectangle that fades in, holds, and fades out.
///
/// Params: `fill` (hex, default a dim slate), `alpha` (peak opacity,
/// default 0.35), `fade` (seconds, default 0.5), `hold` (seconds,
/// default 3.0), `layer` (default 0).
pub fn backdrop(
    sign: &SignDef,
    params: &ParamMap,
    _data: &ParamMap,
    _cycle: u64,
) -> LumyteResult<Vec<AnimationDescriptor>> {
    let fade = param_f64(params, "fade", 0.5);
    let hold = param_f64(params, "hold", 3.0);
    let alpha = param_f64(params, "alpha", 0.35);
    let fill = param_str(params, "fill", "#10141f");
    let layer = param_f64(params, "layer", 0.0) as i32;

    let rect = AnimationDescriptor::rect(layer)
        .prop("fill", fill)
        .prop("x", 0.0)
        .prop("y", 0.0)
        .prop("width", sign.width)
        .prop("height", sign.height)
        .keyframe(Keyframe::new(0.0).set("alpha", 0.0))
        .keyframe(Keyframe::new(fade).ease(Ease::OutQuad).set("alpha", alpha))
        .keyframe(Keyframe::new(hold).set("alpha", alpha))
        .keyframe(Keyframe::new(fade).ease(Ease::InQuad).set("alpha", 0.0));

    Ok(vec![rect])
}

/// Centered text that rises and fades in, holds, and fades out.
///
/// Params: `text` (default "Hello, World!"), `fill` (hex; defaults to the
/// theme palette color for the current cycle), `fontSize` (default 20),
/// `fontWeight` (default "normal"), `fade` / `hold` as in [`backdrop`],
/// `layer` (default 10).
pub fn title(
    sign: &SignDef,
    params: &ParamMap,
    _data: &ParamMap,
    cycle: u64,
) -> LumyteResult<Vec<AnimationDescriptor>> {
    let fade = param_f64(params, "fade", 0.5);
    let hold = param_f64(params, "hold", 3.0);
    let text = param_str(params, "text", "Hello, World!");
    let fill = param_str(params, "fill", cycle_color(&sign.theme, cycle));
    let font_size = param_f64(params, "fontSize", 20.0);
    let font_weight = param_str(params, "fontWeight", "normal");
    let layer = param_f64(params, "layer", 10.0) as i32;

    let center_x = f64::from(sign.width) / 2.0;
    let center_y = f64::from(sign.height) / 2.0;

    let text = AnimationDescriptor::text(layer)
        .prop("text", text)
        .prop("fill", fill)
        .prop("font", "monospace")
        .prop("fontSize", font_size)
        .prop("fontWeight", font_weight)
        .prop("textAlign", "center")
        .prop("textBaseline", "middle")
        .prop("x", center_x)
        .keyframe(
            Keyframe::new(0.0)
                .set("alpha", 0.0)
                .set("y", center_y + 6.0),
        )
        .keyframe(
            Keyframe::new(fade)
                .ease(Ease::OutCubic)
                .set("alpha", 1.0)
                .set("y", center_y),
        )
        .keyframe(Keyframe::new(hold).set("alpha", 1.0))
        .keyframe(Keyframe::new(fade).ease(Ease::InQuad).set("alpha", 0.0));

    Ok(vec![text])
}

/// The movie the player shows when nothing else was loaded: the canonical
/// 320×64 sign greeting the world for four seconds per cycle.
pub fn default_movie() -> LumyteResult<Movie> {
    let def = MovieDef {
        sign: SignDef {
            width: 320,
            height: 64,
            theme: "plasma".to_owned(),
            fps: None,
        },
        data: BTreeMap::new(),
        screenplay: vec![
            ScreenplayEntryDef {
                timeline: "backdrop".to_owned(),
                start: 0.0,
                params: BTreeMap::new(),
            },
            ScreenplayEntryDef {
                timeline: "title".to_owned(),
                start: 0.0,
                params: BTreeMap::new(),
            },
        ],
    };
    Movie::from_def(def)
}
