/// A straight (non-premultiplied) sRGB color with alpha, each channel in `[0, 1]`.
/// All transparent values (alpha == 0) are normalized to transparent black.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Color([f32; 4]);
impl Color {
    pub const TRANSPARENT: Self = Self([0.0; 4]);
    pub const WHITE: Self = Self([1.0; 4]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    /// Create a color from straight channels. Channels are clamped, and fully transparent colors become
    /// [`Color::TRANSPARENT`]. Fails if any channel is not finite.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Result<Self, ColorError> {
        if ![r, g, b, a].iter().all(|c| c.is_finite()) {
            return Err(ColorError::NotFinite);
        }
        let a = a.clamp(0.0, 1.0);
        if a == 0.0 {
            Ok(Self::TRANSPARENT)
        } else {
            Ok(Self([
                r.clamp(0.0, 1.0),
                g.clamp(0.0, 1.0),
                b.clamp(0.0, 1.0),
                a,
            ]))
        }
    }
    #[must_use]
    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        let to_float = |c: u8| f32::from(c) / 255.0;
        // Every u8 maps to a finite float, never fails.
        Self::new(to_float(r), to_float(g), to_float(b), to_float(a)).unwrap_or(Self::TRANSPARENT)
    }
    /// Channels multiplied by alpha, as stored by raster surfaces.
    #[must_use]
    pub fn premultiplied(&self) -> [f32; 4] {
        let [r, g, b, a] = self.0;
        [r * a, g * a, b * a, a]
    }
    #[must_use]
    pub fn to_rgba8(&self) -> [u8; 4] {
        self.0.map(|c| (c * 255.0).round() as u8)
    }
}
impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("color channel not finite")]
    NotFinite,
    #[error("expected `#rgb`, `#rrggbb`, or `#rrggbbaa`, got {0:?}")]
    BadHex(String),
}

impl std::str::FromStr for Color {
    type Err = ColorError;
    /// Parse a CSS-style hex color.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ColorError::BadHex(s.to_owned());
        let digits = s.trim().strip_prefix('#').ok_or_else(bad)?;
        if !digits.is_ascii() {
            return Err(bad());
        }
        let byte = |range: std::ops::Range<usize>| {
            u8::from_str_radix(digits.get(range).ok_or_else(bad)?, 16).map_err(|_| bad())
        };
        let rgba = match digits.len() {
            3 => {
                // Each nibble is doubled, `#f80` == `#ff8800`
                let nibble = |i: usize| byte(i..i + 1).map(|n| n * 17);
                [nibble(0)?, nibble(1)?, nibble(2)?, 255]
            }
            6 => [byte(0..2)?, byte(2..4)?, byte(4..6)?, 255],
            8 => [byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?],
            _ => return Err(bad()),
        };
        Ok(Self::from_rgba8(rgba))
    }
}
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        string.parse().map_err(serde::de::Error::custom)
    }
}
