use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::mono_font::ascii::{
    FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X13_BOLD, FONT_7X13, FONT_7X13_BOLD, FONT_9X15,
    FONT_9X15_BOLD, FONT_9X18, FONT_9X18_BOLD, FONT_10X20,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, StyledDrawable};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_graphics::Drawable;
use log::warn;

use crate::animation::descriptor::DrawKind;
use crate::animation::tween::TweenTrack;
use crate::foundation::core::Brightness;
use crate::foundation::error::LumyteResult;
use crate::render::canvas::Canvas;
use crate::render::color::{compensate, parse_hex};

/// Draw one active track onto the canvas.
///
/// Attributes resolve through the track (tween state first, then static
/// props); the fill color is brightness-compensated before it touches the
/// canvas. The paint alpha is saved and restored around the draw.
pub(crate) fn draw_track(
    canvas: &mut Canvas,
    track: &TweenTrack,
    brightness: Brightness,
) -> LumyteResult<()> {
    let alpha = num(track, "alpha", 1.0);
    if alpha <= 0.0 {
        return Ok(());
    }

    let fill = text(track, "fill", "#ffffff");
    let rgb = match parse_hex(fill) {
        Ok(rgb) => compensate(rgb, brightness),
        Err(err) => {
            warn!("skipping draw with bad fill {fill:?}: {err}");
            return Ok(());
        }
    };
    let color = Rgb888::new(rgb.r, rgb.g, rgb.b);

    match track.kind() {
        DrawKind::Rect => draw_rect(canvas, track, color, alpha)?,
        DrawKind::Text => draw_text(canvas, track, color, alpha)?,
    }
    Ok(())
}

fn draw_rect(
    canvas: &mut Canvas,
    track: &TweenTrack,
    color: Rgb888,
    alpha: f64,
) -> LumyteResult<()> {
    let x = num(track, "x", 0.0).round() as i32;
    let y = num(track, "y", 0.0).round() as i32;
    let width = num(track, "width", 0.0).round();
    let height = num(track, "height", 0.0).round();
    if width < 1.0 || height < 1.0 {
        return Ok(());
    }

    let rect = Rectangle::new(Point::new(x, y), Size::new(width as u32, height as u32));
    canvas.with_alpha(alpha, |c| {
        rect.draw_styled(&PrimitiveStyle::with_fill(color), c)
    })?;
    Ok(())
}

fn draw_text(
    canvas: &mut Canvas,
    track: &TweenTrack,
    color: Rgb888,
    alpha: f64,
) -> LumyteResult<()> {
    let content = text(track, "text", "");
    if content.is_empty() {
        return Ok(());
    }

    let x = num(track, "x", 0.0).round() as i32;
    let y = num(track, "y", 0.0).round() as i32;
    let size = num(track, "fontSize", 10.0);
    let bold = is_bold(track);

    let style = MonoTextStyle::new(mono_font(size, bold), color);
    let text_style = TextStyleBuilder::new()
        .alignment(alignment(text(track, "textAlign", "left")))
        .baseline(baseline(text(track, "textBaseline", "alphabetic")))
        .build();

    canvas.with_alpha(alpha, |c| {
        Text::with_text_style(content, Point::new(x, y), style, text_style).draw(c)
    })?;
    Ok(())
}

fn num(track: &TweenTrack, name: &str, default: f64) -> f64 {
    track
        .attr(name)
        .and_then(|v| v.as_num())
        .unwrap_or(default)
}

fn text<'t>(track: &'t TweenTrack, name: &str, default: &'t str) -> &'t str {
    track
        .attr(name)
        .and_then(|v| v.as_text())
        .unwrap_or(default)
}

fn is_bold(track: &TweenTrack) -> bool {
    match track.attr("fontWeight") {
        Some(value) => match (value.as_num(), value.as_text()) {
            (Some(weight), _) => weight >= 600.0,
            (_, Some(tag)) => tag.eq_ignore_ascii_case("bold"),
            _ => false,
        },
        None => false,
    }
}

/// Select the closest built-in mono font for a CSS-ish font size.
///
/// The sign is 64 px tall, so the ladder tops out at 10×20; bold variants
/// exist only for the mid sizes.
fn mono_font(size: f64, bold: bool) -> &'static MonoFont<'static> {
    if bold {
        if size <= 13.0 {
            &FONT_6X13_BOLD
        } else if size <= 14.0 {
            &FONT_7X13_BOLD
        } else if size <= 16.0 {
            &FONT_9X15_BOLD
        } else {
            &FONT_9X18_BOLD
        }
    } else if size <= 6.0 {
        &FONT_4X6
    } else if size <= 8.0 {
        &FONT_5X8
    } else if size <= 10.0 {
        &FONT_6X10
    } else if size <= 13.0 {
        &FONT_7X13
    } else if size <= 16.0 {
        &FONT_9X15
    } else if size <= 18.0 {
        &FONT_9X18
    } else {
        &FONT_10X20
    }
}

fn alignment(tag: &str) -> Alignment {
    match tag {
        "center" => Alignment::Center,
        "right" => Alignment::Right,
        _ => Alignment::Left,
    }
}

fn baseline(tag: &str) -> Baseline {
    match tag {
        "top" => Baseline::Top,
        "middle" => Baseline::Middle,
        "bottom" => Baseline::Bottom,
        _ => Baseline::Alphabetic,
    }
}
