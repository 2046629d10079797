//! Status text and the F3 debug panel, painted with egui over the scene.
//!
//! egui needs a `RenderPass<'static>`, so a frame goes through four phases:
//!
//!   1. `prepare()` -- run the UI, tessellate into primitives
//!   2. `upload()`  -- update egui textures and buffers (borrows the encoder)
//!   3. `paint()`   -- draw into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui dropped this frame
//!
//! The status line is always drawn. The debug panel only when `debug_visible`.

use hop_core::time::GameClock;
use winit::window::Window;

/// Point size of all HUD text.
pub const HUD_FONT_SIZE: f32 = 24.0;

const STATUS_MARGIN: egui::Vec2 = egui::vec2(-20.0, 20.0);

/// Per-frame values the game hands to the overlay.
#[derive(Debug, Clone, Default)]
pub struct HudStats {
    pub status: String,
    pub level_id: String,
    pub jumps_done: u32,
    pub airborne: bool,
    pub game_over: bool,
    pub quads: u32,
    pub draw_calls: u32,
}

/// Switch every text style to the fixed HUD font size.
pub fn install_font_style(ctx: &egui::Context) {
    ctx.style_mut(|style| {
        for font in style.text_styles.values_mut() {
            font.size = HUD_FONT_SIZE;
        }
    });
}

pub struct HudOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl HudOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        install_font_style(&egui_ctx);
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug overlay: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &GameClock,
        stats: &HudStats,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_status(ctx, stats);
            if debug_visible {
                draw_debug_panel(ctx, clock, stats);
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn draw_status(ctx: &egui::Context, stats: &HudStats) {
    let color = if stats.game_over {
        egui::Color32::from_rgb(200, 40, 40)
    } else {
        egui::Color32::DARK_GRAY
    };
    egui::Area::new(egui::Id::new("hud_status"))
        .anchor(egui::Align2::RIGHT_TOP, STATUS_MARGIN)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(&stats.status).color(color));
        });
}

fn draw_debug_panel(ctx: &egui::Context, clock: &GameClock, stats: &HudStats) {
    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", clock.fps()));
            ui.label(format!("Smoothed FPS: {:.1}", clock.smoothed_fps));
            ui.label(format!(
                "Frame time: {:.2} ms",
                clock.smoothed_frame_time_ms
            ));
            ui.label(format!("Frame: {}", clock.frame_count));
            ui.separator();
            ui.label(format!("Level: {}", stats.level_id));
            ui.label(format!("Jumps: {}", stats.jumps_done));
            ui.label(format!("Airborne: {}", stats.airborne));
            ui.label(format!("Quads: {}", stats.quads));
            ui.label(format!("Draw calls: {}", stats.draw_calls));
        });
}
