use crate::foundation::core::Rgb8;

/// Named background colors accepted on the command line.
const NAMED_COLORS: &[(&str, Rgb8)] = &[
    ("green", Rgb8::new(0x00, 0xFF, 0x00)),
    ("lime", Rgb8::new(0x00, 0xFF, 0x00)),
    ("red", Rgb8::new(0xFF, 0x00, 0x00)),
    ("blue", Rgb8::new(0x00, 0x00, 0xFF)),
    ("white", Rgb8::new(0xFF, 0xFF, 0xFF)),
    ("black", Rgb8::new(0x00, 0x00, 0x00)),
    ("gray", Rgb8::new(0x80, 0x80, 0x80)),
    ("grey", Rgb8::new(0x80, 0x80, 0x80)),
    ("yellow", Rgb8::new(0xFF, 0xFF, 0x00)),
    ("cyan", Rgb8::new(0x00, 0xFF, 0xFF)),
    ("magenta", Rgb8::new(0xFF, 0x00, 0xFF)),
    ("purple", Rgb8::new(0x80, 0x00, 0x80)),
    ("orange", Rgb8::new(0xFF, 0xA5, 0x00)),
    ("pink", Rgb8::new(0xFF, 0xC0, 0xCB)),
    ("brown", Rgb8::new(0xA5, 0x2A, 0x2A)),
    ("gold", Rgb8::new(0xFF, 0xD7, 0x00)),
    ("silver", Rgb8::new(0xC0, 0xC0, 0xC0)),
    ("navy", Rgb8::new(0x00, 0x00, 0x80)),
    ("teal", Rgb8::new(0x00, 0x80, 0x80)),
    ("olive", Rgb8::new(0x80, 0x80, 0x00)),
    ("maroon", Rgb8::new(0x80, 0x00, 0x00)),
];

/// Outcome of resolving a user-supplied background color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorResolution {
    pub rgb: Rgb8,
    /// `true` when the input was not understood and white was substituted.
    pub fell_back: bool,
}

/// Names accepted by [`parse_color`], in table order.
pub fn color_names() -> impl Iterator<Item = &'static str> {
    NAMED_COLORS.iter().map(|(name, _)| *name)
}

/// Strict parse: a known color name (case-insensitive) or `RRGGBB` / `#RRGGBB`.
pub fn parse_color(input: &str) -> Option<Rgb8> {
    let s = input.trim();
    if let Some((_, rgb)) = NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
    {
        return Some(*rgb);
    }
    parse_hex(s)
}

/// Permissive parse used for the opaque background.
///
/// Unrecognized input degrades to white instead of failing the run. The substitution is logged
/// and reported through [`ColorResolution::fell_back`].
pub fn resolve_background(input: &str) -> ColorResolution {
    match parse_color(input) {
        Some(rgb) => ColorResolution {
            rgb,
            fell_back: false,
        },
        None => {
            tracing::warn!(input, "unrecognized background color, falling back to white");
            ColorResolution {
                rgb: Rgb8::WHITE,
                fell_back: true,
            }
        }
    }
}

fn parse_hex(s: &str) -> Option<Rgb8> {
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&s[range], 16).ok();
    Some(Rgb8::new(byte(0..2)?, byte(2..4)?, byte(4..6)?))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
