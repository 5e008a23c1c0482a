use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An RGB backlight colour, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(128, 128, 128);
    pub const RED: Color = Color::new(64, 0, 0);
    pub const GREEN: Color = Color::new(0, 64, 0);
    pub const BLUE: Color = Color::new(0, 0, 64);
    pub const YELLOW: Color = Color::new(64, 64, 0);
    pub const PURPLE: Color = Color::new(78, 0, 105);
    pub const LIGHT_GREY: Color = Color::new(32, 32, 32);
    pub const GREY: Color = Color::new(6, 6, 6);
    pub const SELECTED_LAYER: Color = Color::new(32, 32, 32);
    pub const UNSELECTED_LAYER: Color = Color::new(4, 4, 4);
    pub const SLEEPING: Color = Color::new(2, 2, 2);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Halves every channel.
    pub const fn darken(self) -> Self {
        Self::new(self.r / 2, self.g / 2, self.b / 2)
    }

    /// Multiplies every channel by `num / den`, saturating at 255.
    pub fn scale(self, num: u16, den: u16) -> Self {
        let den = den.max(1);
        let ch = |c: u8| (u32::from(c) * u32::from(num) / u32::from(den)).min(255) as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }

    /// Linear mix towards `other`; `amount` 0 keeps `self`, 255 yields `other`.
    pub fn blend(self, other: Color, amount: u8) -> Self {
        let a = u16::from(amount);
        let inv = 255 - a;
        let ch = |s: u8, o: u8| ((u16::from(s) * inv + u16::from(o) * a) / 255) as u8;
        Self::new(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }

    pub fn is_off(self) -> bool {
        self == Self::OFF
    }

    /// Looks up a palette entry by its macro-file name, e.g. `COLOR_BLUE`.
    pub fn from_palette(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix("COLOR_").unwrap_or(name);
        let c = match name.to_ascii_uppercase().as_str() {
            "OFF" => Self::OFF,
            "WHITE" => Self::WHITE,
            "RED" => Self::RED,
            "GREEN" => Self::GREEN,
            "BLUE" => Self::BLUE,
            "YELLOW" => Self::YELLOW,
            "PURPLE" => Self::PURPLE,
            "LIGHT_GREY" => Self::LIGHT_GREY,
            "GREY" => Self::GREY,
            "SELECTED_LAYER" => Self::SELECTED_LAYER,
            "UNSELECTED_LAYER" => Self::UNSELECTED_LAYER,
            "SLEEPING" => Self::SLEEPING,
            _ => return None,
        };
        Some(c)
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseColorError {
    #[error("unknown palette colour: {0}")]
    UnknownName(String),
    #[error("expected \"r,g,b\" with three channels, got {0:?}")]
    WrongArity(String),
    #[error("channel out of range 0-255: {0:?}")]
    BadChannel(String),
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts a palette name (`COLOR_RED`, `red`) or `"r,g,b"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.contains(',') {
            return Self::from_palette(s).ok_or_else(|| ParseColorError::UnknownName(s.to_string()));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseColorError::WrongArity(s.to_string()));
        }
        let mut rgb = [0u8; 3];
        for (slot, part) in rgb.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u8>()
                .map_err(|_| ParseColorError::BadChannel(part.to_string()))?;
        }
        Ok(Self::from(rgb))
    }
}
