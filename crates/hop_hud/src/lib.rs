pub mod overlay;

pub use overlay::{install_font_style, HudOverlay, HudStats, HUD_FONT_SIZE};
