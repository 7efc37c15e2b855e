use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{LipsyncError, LipsyncResult};

/// Mouth shape code, as emitted by the Rhubarb aligner.
///
/// `X` is the rest (closed-mouth) shape and doubles as the fallback frame for codes that have no
/// sprite.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum MouthShape {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    X,
}

impl MouthShape {
    /// Every recognized code, in sprite discovery order.
    pub const ALL: [MouthShape; 9] = [
        MouthShape::A,
        MouthShape::B,
        MouthShape::C,
        MouthShape::D,
        MouthShape::E,
        MouthShape::F,
        MouthShape::G,
        MouthShape::H,
        MouthShape::X,
    ];

    /// The rest / closed-mouth shape.
    pub const REST: MouthShape = MouthShape::X;

    pub fn code(self) -> char {
        match self {
            MouthShape::A => 'A',
            MouthShape::B => 'B',
            MouthShape::C => 'C',
            MouthShape::D => 'D',
            MouthShape::E => 'E',
            MouthShape::F => 'F',
            MouthShape::G => 'G',
            MouthShape::H => 'H',
            MouthShape::X => 'X',
        }
    }

    /// File name used for both source sprites and materialized frames: `mouth_<CODE>.png`.
    pub fn file_name(self) -> String {
        format!("mouth_{}.png", self.code())
    }
}

impl fmt::Display for MouthShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for MouthShape {
    type Err = LipsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MouthShape::ALL
            .into_iter()
            .find(|shape| s.len() == 1 && s.starts_with(shape.code()))
            .ok_or_else(|| {
                LipsyncError::malformed_timeline(format!("unknown mouth shape code \"{s}\""))
            })
    }
}

/// Pixel dimensions shared by every sprite and frame of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated resolution with both dimensions non-zero.
    pub fn new(width: u32, height: u32) -> LipsyncResult<Self> {
        if width == 0 || height == 0 {
            return Err(LipsyncError::configuration(format!(
                "resolution must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Opaque RGB8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
