use super::*;

#[test]
fn parses_hex_with_and_without_hash() {
    assert_eq!(parse_hex("#ff8001").unwrap(), Rgb::new(0xff, 0x80, 0x01));
    assert_eq!(parse_hex("FF8001").unwrap(), Rgb::new(0xff, 0x80, 0x01));
}

#[test]
fn rejects_malformed_hex() {
    assert!(parse_hex("#fff").is_err());
    assert!(parse_hex("#gg0000").is_err());
    assert!(parse_hex("#ff800112").is_err());
    assert!(parse_hex("").is_err());
}

#[test]
fn full_brightness_is_identity() {
    let color = Rgb::new(12, 200, 99);
    assert_eq!(compensate(color, Brightness::clamped(100)), color);
}

#[test]
fn bright_colors_scale_linearly() {
    // avg >= 100, so no dark boost: channels scale by 1 - 0.7*(1 - b/100).
    let color = Rgb::new(200, 150, 130);
    let out = compensate(color, Brightness::clamped(50));
    let scale: f64 = 1.0 - 0.7 * 0.5;
    assert_eq!(out.r, (200.0 * scale).round() as u8);
    assert_eq!(out.g, (150.0 * scale).round() as u8);
    assert_eq!(out.b, (130.0 * scale).round() as u8);
}

#[test]
fn dark_colors_get_boosted() {
    // avg 30 -> boost 0.07 on top of the base scale.
    let dark = Rgb::new(30, 30, 30);
    let bright = Rgb::new(200, 200, 200);
    let b = Brightness::clamped(40);

    let dark_scale = f64::from(compensate(dark, b).r) / 30.0;
    let bright_scale = f64::from(compensate(bright, b).r) / 200.0;
    assert!(dark_scale > bright_scale);
}

#[test]
fn channels_are_monotone_in_brightness() {
    // Holds for inputs clear of the dark-boost discontinuity at avg 100.
    let color = Rgb::new(180, 140, 120);
    let mut prev = compensate(color, Brightness::clamped(1));
    for level in 2..=100 {
        let next = compensate(color, Brightness::clamped(level));
        assert!(next.r >= prev.r && next.g >= prev.g && next.b >= prev.b);
        prev = next;
    }
}

#[test]
fn output_never_overflows() {
    let color = Rgb::new(255, 0, 0); // avg 85: boosted and near the top
    for level in 1..=100 {
        let out = compensate(color, Brightness::clamped(level));
        assert!(out.r <= 255);
    }
}
