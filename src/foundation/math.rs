pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Straight-alpha "over" of one color channel onto an opaque background channel.
pub(crate) fn over_opaque_channel(src: u8, alpha: u8, bg: u8) -> u8 {
    let a = u16::from(alpha);
    let sum = mul_div255_u16(u16::from(src), a) + mul_div255_u16(u16::from(bg), 255 - a);
    sum.min(255) as u8
}

/// Floor of `(outer - inner) / 2`, negative when `inner` is larger.
pub(crate) fn center_offset(outer: u32, inner: u32) -> i64 {
    (i64::from(outer) - i64::from(inner)).div_euclid(2)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
