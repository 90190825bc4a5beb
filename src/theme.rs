use bevy::prelude::*;

pub const SURFACE_COLOR: Color = Color::srgb(0.13, 0.13, 0.13);
pub const TEXT_COLOR: Color = Color::srgb(0.92, 0.92, 0.92);
pub const ACCENT_COLOR: Color = Color::srgb(0.10, 0.60, 0.25);

/// Styling context handed to every affordance plugin at initialization and
/// passed through unmodified to the components it spawns. The registry never
/// interprets it.
#[derive(Clone, Debug)]
pub struct Theme {
    pub surface: Color,
    pub text: Color,
    pub accent: Color,
    pub font_size: f32,
    /// Fixed surface size for tooltip elements. The host DOM the original
    /// design assumed auto-sizes its elements; this engine does not.
    pub surface_size: Vec2,
    pub text_padding: Vec2,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface: SURFACE_COLOR,
            text: TEXT_COLOR,
            accent: ACCENT_COLOR,
            font_size: 14.0,
            surface_size: Vec2::new(240.0, 48.0),
            text_padding: Vec2::new(10.0, 6.0),
        }
    }
}

impl Theme {
    pub const fn with_surface_size(mut self, size: Vec2) -> Self {
        self.surface_size = size;
        self
    }

    pub const fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }
}
