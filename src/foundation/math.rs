pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Undo premultiplication for one channel, rounding to nearest.
pub(crate) fn unpremul_u8(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
    v.min(255) as u8
}

/// Map a percent value onto `[0, 1]`, treating non-finite input as fully opaque.
pub(crate) fn percent_to_unit(percent: f64) -> f32 {
    if !percent.is_finite() {
        return 1.0;
    }
    (percent.clamp(0.0, 100.0) / 100.0) as f32
}

/// Map a `[0, 1]` fraction onto an 8-bit alpha.
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
