use super::*;

#[test]
fn endpoints_are_fixed_for_every_ease() {
    let eases = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ];
    for ease in eases {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?} at 0");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?} at 1");
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::Linear.apply(-0.5), 0.0);
    assert_eq!(Ease::Linear.apply(1.5), 1.0);
}

#[test]
fn in_quad_lags_and_out_quad_leads_linear() {
    assert!(Ease::InQuad.apply(0.3) < 0.3);
    assert!(Ease::OutQuad.apply(0.3) > 0.3);
}

#[test]
fn in_out_variants_are_symmetric_around_midpoint() {
    for ease in [Ease::InOutQuad, Ease::InOutCubic] {
        let lo = ease.apply(0.25);
        let hi = ease.apply(0.75);
        assert!((lo + hi - 1.0).abs() < 1e-12, "{ease:?}");
    }
}
