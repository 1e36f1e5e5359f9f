//! Hex colors and lead-shade lightening

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    #[error("color must start with '#'")]
    MissingHash,
    #[error("invalid color length {0}, expected 6 hex digits")]
    InvalidLength(usize),
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// 8-bit sRGB color, written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    /// Blend toward white: each channel becomes `ch + (255 - ch) * factor`,
    /// rounded. `factor` is clamped to [0, 1].
    pub fn lighten(self, factor: f64) -> Self {
        let f = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        let blend = |ch: u8| {
            let ch = ch as f64;
            (ch + (255.0 - ch) * f).round() as u8
        };
        Rgb([blend(self.0[0]), blend(self.0[1]), blend(self.0[2])])
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }

    /// Channels scaled to 0.0..=1.0
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.0[0] as f32 / 255.0,
            self.0[1] as f32 / 255.0,
            self.0[2] as f32 / 255.0,
        ]
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorError::Empty);
        }
        let hex = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;
        if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(bad));
        }
        if hex.len() != 6 {
            return Err(ColorError::InvalidLength(hex.len()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError::InvalidLength(hex.len()))
        };
        Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#FFB347".parse::<Rgb>(), Ok(Rgb::new(0xff, 0xb3, 0x47)));
        assert_eq!("#2ecc40".parse::<Rgb>(), Ok(Rgb::new(0x2e, 0xcc, 0x40)));
        assert_eq!("".parse::<Rgb>(), Err(ColorError::Empty));
        assert_eq!("777777".parse::<Rgb>(), Err(ColorError::MissingHash));
        assert_eq!("#777".parse::<Rgb>(), Err(ColorError::InvalidLength(3)));
        assert_eq!("#77777g".parse::<Rgb>(), Err(ColorError::InvalidHex('g')));
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(Rgb::new(0x77, 0x77, 0x77).to_hex(), "#777777");
        assert_eq!(Rgb::new(255, 0, 10).to_string(), "#ff000a");
    }

    #[test]
    fn test_lighten_identity_and_white() {
        let colors = [Rgb::new(0xff, 0xb3, 0x47), Rgb::new(0, 0, 0), Rgb::new(0x2e, 0xcc, 0x40)];
        for c in colors {
            assert_eq!(c.lighten(0.0), c);
            assert_eq!(c.lighten(0.0).lighten(0.45), c.lighten(0.45));
            assert_eq!(c.lighten(1.0), Rgb::WHITE);
        }
    }

    #[test]
    fn test_lighten_rounds_channels() {
        // 0x2e=46 -> 46 + 209*0.45 = 140.05 -> 140
        // 0xcc=204 -> 204 + 51*0.45 = 226.95 -> 227
        // 0x40=64 -> 64 + 191*0.45 = 149.95 -> 150
        assert_eq!(Rgb::new(0x2e, 0xcc, 0x40).lighten(0.45), Rgb::new(140, 227, 150));
        assert_eq!(Rgb::new(0, 0, 0).lighten(0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_lighten_clamps_factor() {
        let c = Rgb::new(10, 20, 30);
        assert_eq!(c.lighten(-1.0), c);
        assert_eq!(c.lighten(3.0), Rgb::WHITE);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let c: Rgb = serde_json::from_str("\"#B39DFF\"").unwrap();
        assert_eq!(c, Rgb::new(0xb3, 0x9d, 0xff));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#b39dff\"");
        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }
}
