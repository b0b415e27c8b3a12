use approx::relative_eq;
use bytemuck::{Pod, Zeroable};
use palette::{rgb::Srgba, Component, IntoComponent, Srgb};

/// A RGBA color with f32 components.
#[derive(Default, Clone, Debug, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    red: f32,
    green: f32,
    blue: f32,
    alpha: f32,
}

/// A RGBA color packed into bytes, as stored in vertex data.
#[repr(C)]
#[derive(Default, Clone, Debug, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba8 {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl<U: Component + IntoComponent<f32>> From<Srgba<U>> for Color {
    fn from(color: Srgba<U>) -> Self {
        let color = color.into_format::<_, f32>();
        Self::new(
            color.color.red,
            color.color.green,
            color.color.blue,
            color.alpha,
        )
    }
}

impl<U: Component + IntoComponent<f32>> From<Srgb<U>> for Color {
    fn from(color: Srgb<U>) -> Self {
        let color = color.into_format::<f32>();
        Self::new(color.red, color.green, color.blue, 1.)
    }
}

impl From<Color> for Srgba {
    fn from(color: Color) -> Self {
        Self::new(color.red, color.green, color.blue, color.alpha)
    }
}

impl From<Color> for Rgba8 {
    fn from(color: Color) -> Self {
        Self {
            r: to_byte(color.red),
            g: to_byte(color.green),
            b: to_byte(color.blue),
            a: to_byte(color.alpha),
        }
    }
}

impl From<Rgba8> for Color {
    fn from(color: Rgba8) -> Self {
        Self::new(
            f32::from(color.r) / 255.,
            f32::from(color.g) / 255.,
            f32::from(color.b) / 255.,
            f32::from(color.a) / 255.,
        )
    }
}

fn to_byte(component: f32) -> u8 {
    (component.clamp(0., 1.) * 255.).round() as u8
}

impl Color {
    /// Opaque white. Sprites tinted white show their texture unchanged.
    pub const WHITE: Self = Self::new(1., 1., 1., 1.);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0., 0., 0., 1.);
    /// Fully transparent black.
    pub const CLEAR_BLACK: Self = Self::new(0., 0., 0., 0.);

    /// Returns a color from its red, green, blue and alpha components, each
    /// in the range `0.0..=1.0`.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> f32 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> f32 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> f32 {
        self.blue
    }

    /// Returns the alpha component.
    #[must_use]
    pub const fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns the color as an f32 array.
    #[must_use]
    pub const fn rgba(&self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// Returns if the color has a non-zero alpha value.
    #[must_use]
    pub fn visible(&self) -> bool {
        !relative_eq!(self.alpha, 0.)
    }

    /// Returns a new color using red, green, and blue from `self` and the
    /// parameter `alpha`.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}
