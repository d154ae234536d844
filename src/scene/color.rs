use glam::{Vec3, Vec4};

/// An sRGB color with components in `[0, 1]`.
///
/// Scene colors (background, lights, grid) are authored as hex values in
/// sRGB space and converted to linear space only when uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` value.
    #[must_use]
    pub fn from_hex(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Self::from_srgb_u8([r, g, b])
    }

    #[must_use]
    pub fn to_hex(self) -> u32 {
        let [r, g, b] = self.to_srgb_u8();
        u32::from_be_bytes([0, r, g, b])
    }

    #[must_use]
    pub fn from_srgb_u8(rgb: [u8; 3]) -> Self {
        Self::new(
            f32::from(rgb[0]) / 255.0,
            f32::from(rgb[1]) / 255.0,
            f32::from(rgb[2]) / 255.0,
        )
    }

    #[must_use]
    pub fn to_srgb_u8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Converts to linear space (for lighting math and sRGB render targets).
    #[must_use]
    pub fn to_linear(self) -> Vec3 {
        Vec3::new(
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        )
    }

    #[must_use]
    pub fn to_linear_rgba(self) -> Vec4 {
        self.to_linear().extend(1.0)
    }

    /// Clear color for a render pass targeting an sRGB surface.
    #[must_use]
    pub fn to_wgpu_linear(self) -> wgpu::Color {
        let linear = self.to_linear();
        wgpu::Color {
            r: f64::from(linear.x),
            g: f64::from(linear.y),
            b: f64::from(linear.z),
            a: 1.0,
        }
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_keeps_bytes() {
        assert_eq!(Color::from_hex(0x000f1e).to_hex(), 0x000f1e);
        assert_eq!(Color::from_hex(0x00aeeb).to_srgb_u8(), [0x00, 0xae, 0xeb]);
    }

    #[test]
    fn linear_conversion_fixes_extremes() {
        assert_eq!(Color::BLACK.to_linear(), Vec3::ZERO);
        let white = Color::WHITE.to_linear();
        assert!((white - Vec3::ONE).abs().max_element() < 1e-6);
        // Mid grey is darker in linear space.
        assert!(Color::new(0.5, 0.5, 0.5).to_linear().x < 0.25);
    }
}
