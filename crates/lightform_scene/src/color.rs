//! Display colors
//!
//! Colors are authored and saved as CSS hex strings in sRGB. Shading works
//! in linear light, so every consumer goes through [`Color::to_linear`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SceneError;

/// 8-bit sRGB color
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self, SceneError> {
        let invalid = || SceneError::InvalidColor(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                    channels[i] = v * 17;
                }
                Ok(Self::rgb(channels[0], channels[1], channels[2]))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
                Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear-light RGB in `[0, 1]`
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r as f32 / 255.0),
            srgb_to_linear(self.g as f32 / 255.0),
            srgb_to_linear(self.b as f32 / 255.0),
        ]
    }
}

/// sRGB electro-optical transfer
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB opto-electronic transfer
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self.to_hex())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_and_long() {
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::from_hex("#ff8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(Color::from_hex("0a0B0c").unwrap(), Color::rgb(10, 11, 12));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Color::from_hex("#ff").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("white").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let c = Color::rgb(1, 2, 254);
        assert_eq!(Color::from_hex(&c.to_hex()).unwrap(), c);
    }

    #[test]
    fn test_linear_conversion() {
        for c in Color::WHITE.to_linear() {
            assert!((c - 1.0).abs() < 1e-6);
        }
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let mid = srgb_to_linear(0.5);
        assert!((mid - 0.214).abs() < 1e-3);
        assert!((linear_to_srgb(mid) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_serde_as_hex() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 255)).unwrap();
        assert_eq!(json, "\"#ff00ff\"");
        let back: Color = serde_json::from_str("\"#f0f\"").unwrap();
        assert_eq!(back, Color::MAGENTA);
    }
}
