use crate::foundation::core::Brightness;
use crate::foundation::error::{LumyteError, LumyteResult};

/// A straight (non-premultiplied) RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Construct from channel values.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parse a `#rrggbb` hex color (leading `#` optional, case-insensitive).
pub fn parse_hex(s: &str) -> LumyteResult<Rgb> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> LumyteResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| LumyteError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if s.len() != 6 || !s.is_ascii() {
        return Err(LumyteError::validation(
            "fill color must be #RRGGBB (case-insensitive)",
        ));
    }

    Ok(Rgb {
        r: hex_byte(&s[0..2])?,
        g: hex_byte(&s[2..4])?,
        b: hex_byte(&s[4..6])?,
    })
}

/// Scale a fill color for perceived brightness.
///
/// At full brightness the color passes through untouched. Below that, all
/// channels are scaled down, but dark tones (average channel < 100) get a
/// small boost back up: at low hardware brightness the LEDs crush dark
/// colors to black well before bright ones dim visibly. The 0.7 scale
/// factor and 0.1 boost ceiling are tuned against the panel.
pub fn compensate(color: Rgb, brightness: Brightness) -> Rgb {
    if brightness == Brightness::MAX {
        return color;
    }

    let level = f64::from(brightness.get()) / 100.0;
    let mut scale = 1.0 - 0.7 * (1.0 - level);

    let avg = (f64::from(color.r) + f64::from(color.g) + f64::from(color.b)) / 3.0;
    if avg < 100.0 {
        scale += (1.0 - avg / 100.0) * 0.1;
    }

    let apply = |channel: u8| -> u8 {
        (f64::from(channel) * scale).round().min(255.0) as u8
    };

    Rgb {
        r: apply(color.r),
        g: apply(color.g),
        b: apply(color.b),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
