use std::sync::Arc;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window, WindowAttributes};

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Borderless full screen on the current monitor instead of a window.
    pub fullscreen: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Tile Hopper".to_string(),
            width: 1024,
            height: 384,
            fullscreen: false,
        }
    }
}

impl PlatformConfig {
    pub fn window_attributes(&self) -> WindowAttributes {
        let attrs = WindowAttributes::default()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(self.width, self.height))
            .with_resizable(!self.fullscreen);
        if self.fullscreen {
            attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            attrs
        }
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, OsError> {
    let window = event_loop.create_window(config.window_attributes())?;
    log::info!(
        "Window created: {}x{} ({})",
        config.width,
        config.height,
        if config.fullscreen {
            "full screen"
        } else {
            "windowed"
        }
    );
    Ok(Arc::new(window))
}
