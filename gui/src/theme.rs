//! Colour constants for the chrome around the board (status bar, ghost
//! overlay alpha); the board's own palette comes from each back-end's
//! [`puzzles::Backend::colours`] and is converted with [`to_iced_color`].
//!
//! Grounded on `tesuji::gui::theme`'s flat `pub const Color` table.

use iced::Color;

pub const GHOST_ALPHA: f32 = 0.40;

pub const STATUS_INFO: Color = Color::from_rgb(0.2, 0.6, 0.2);
pub const STATUS_WARNING: Color = Color::from_rgb(0.8, 0.6, 0.0);
pub const STATUS_ERROR: Color = Color::from_rgb(0.8, 0.2, 0.2);

pub fn to_iced_color(colour: puzzles::drawing::Colour) -> Color {
    Color::from_rgb(colour.r, colour.g, colour.b)
}
