use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn f32_to_u8_color(x: f32) -> u8 {
    (x * 255.0).floor().clamp(0.0, 255.0) as u8
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Builds a color from 8-bit channels, e.g. `Color::from_rgba_u8(0xff, 0x80, 0x00, 0xff)`.
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn as_rgba_f32(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn as_rgba_u8(&self) -> [u8; 4] {
        [
            f32_to_u8_color(self.r),
            f32_to_u8_color(self.g),
            f32_to_u8_color(self.b),
            f32_to_u8_color(self.a),
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_conversion_clamps() {
        let color = Color::rgba(1.5, -0.2, 0.5, 1.0);
        assert_eq!(color.as_rgba_u8(), [255, 0, 127, 255]);
    }

    #[test]
    fn from_u8_round_trips_extremes() {
        let color = Color::from_rgba_u8(255, 0, 255, 0);
        assert_eq!(color.as_rgba_f32(), [1.0, 0.0, 1.0, 0.0]);
    }
}
