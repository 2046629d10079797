//! Tile Hopper: window host and application entry point.
//!
//! Everything that can fail on disk (config, maps, images, animations,
//! sounds) is loaded before the event loop starts; a bad resource ends the
//! process with an error instead of a half-built game.
//!
//! winit drives the event loop via `ApplicationHandler`. Frames are paced by
//! [`LoopShell`]: each `RedrawRequested` runs one update/draw/present
//! iteration with the real elapsed time, and the next redraw is scheduled one
//! nap later with `ControlFlow::WaitUntil`.

mod assets;
mod audio;
mod body;
mod collision;
mod config;
mod draw;
mod level;
mod patrol;
mod physics;
mod player;
#[cfg(test)]
mod replay;
mod session;
mod tilemap;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use hop_core::animation::load_animation_file;
use hop_core::input::{EventQueue, InputState, Key, KeyEvent};
use hop_core::shell::{FrameHooks, LoopControl, LoopShell};
use hop_core::time::GameClock;
use hop_core::ResourceError;
use hop_hud::{HudOverlay, HudStats};
use hop_platform::window::create_window;
use hop_render::{Camera2D, GpuContext, GpuMesh, SpriteBatch, SpritePipeline, Texture};

use assets::{ImageRegistry, TileImages};
use audio::AudioPlayer;
use config::{asset_path, load_config_from_path, GameConfig};
use level::LevelCatalog;
use player::AnimationTable;
use session::{GameEvent, GameSession, TickInput};

const ASSET_ROOT: &str = "assets";
const CONFIG_PATH: &str = "config/game.json";
const INITIAL_QUAD_CAPACITY: usize = 256;

/// Everything read from disk before a window exists.
struct GameResources {
    config: GameConfig,
    images: ImageRegistry,
    tiles: TileImages,
    session: GameSession,
    audio: AudioPlayer,
}

fn load_resources(root: &Path) -> Result<GameResources, ResourceError> {
    let config = load_config_from_path(&root.join(CONFIG_PATH))?;
    let catalog = LevelCatalog::load(&config.levels, root)?;

    let mut images = ImageRegistry::new();
    let animation_path = asset_path(root, &config.animations);
    let animation_file = load_animation_file(&animation_path)?;
    let animations = AnimationTable::load(&animation_file, &animation_path, root, &mut images)?;
    let tiles = TileImages::load(&config.tiles, root, &mut images)?;
    catalog.warn_undrawable_tiles(&tiles);

    let audio = AudioPlayer::new(&config.sounds, root)?;
    let session = GameSession::new(catalog, animations, &config);
    log::info!(
        "Loaded {} images, starting on level '{}'",
        images.len(),
        session.level_id()
    );

    Ok(GameResources {
        config,
        images,
        tiles,
        session,
        audio,
    })
}

struct GpuSpriteTexture {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Swapchain image acquired for one frame.
struct Frame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// All live game state. Constructed in `ApplicationHandler::resumed` once the
/// window and GPU surface are available.
struct GameHost {
    window: Arc<Window>,
    gpu: GpuContext,
    sprite_pipeline: SpritePipeline,
    hud: HudOverlay,
    camera: Camera2D,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    /// Indexed by `ImageHandle`, which is also the batch texture key.
    textures: Vec<GpuSpriteTexture>,
    batch: SpriteBatch,
    mesh: GpuMesh,

    events: EventQueue,
    input: InputState,
    session: GameSession,
    tiles: TileImages,
    audio: AudioPlayer,
    camera_margin: f32,
    clear_color: wgpu::Color,
}

impl GameHost {
    fn new(window: Arc<Window>, resources: GameResources) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let hud = HudOverlay::new(&gpu.device, gpu.surface_format, &window);

        let textures = resources
            .images
            .iter()
            .map(|(handle, image)| {
                let texture = Texture::from_rgba8(
                    &gpu.device,
                    &gpu.queue,
                    &image.rgba,
                    image.width,
                    image.height,
                    &image.path,
                );
                let bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &texture);
                log::debug!(
                    "Uploaded texture #{} '{}' ({}x{})",
                    handle.0,
                    image.path,
                    image.width,
                    image.height
                );
                GpuSpriteTexture {
                    _texture: texture,
                    bind_group,
                }
            })
            .collect();

        let camera = Camera2D::new(gpu.size.0, gpu.size.1);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let mesh = GpuMesh::new(&gpu.device, INITIAL_QUAD_CAPACITY);

        let [r, g, b] = resources.config.background;
        let clear_color = wgpu::Color {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
            a: 1.0,
        };

        Ok(Self {
            window,
            gpu,
            sprite_pipeline,
            hud,
            camera,
            camera_buffer,
            camera_bind_group,
            textures,
            batch: SpriteBatch::with_capacity(INITIAL_QUAD_CAPACITY),
            mesh,
            events: EventQueue::new(),
            input: InputState::new(),
            session: resources.session,
            tiles: resources.tiles,
            audio: resources.audio,
            camera_margin: resources.config.camera.margin,
            clear_color,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.gpu.resize(width, height);
            self.camera.viewport = (width, height);
            log::info!("Resized to {}x{}", width, height);
        }
    }

    fn hud_stats(&self) -> HudStats {
        HudStats {
            status: self.session.status_text(),
            level_id: self.session.level_id().to_string(),
            jumps_done: self.session.jumps_done(),
            airborne: self.session.is_falling(),
            game_over: self.session.is_game_over(),
            quads: self.batch.quad_count() as u32,
            draw_calls: self.batch.draw_calls.len() as u32,
        }
    }
}

impl FrameHooks for GameHost {
    type Surface = Frame;

    fn setup(&mut self) {
        self.audio.start_music();
    }

    fn update(&mut self, elapsed_ms: u64, control: &mut LoopControl) {
        self.events.drain_into(&mut self.input);

        if self.input.is_just_pressed(Key::Escape) {
            log::info!("Escape pressed, exiting.");
            control.stop();
        }
        if self.input.is_just_pressed(Key::F3) {
            self.hud.toggle_debug();
        }

        let tick = TickInput::from_input(&self.input);
        for event in self.session.tick(&tick, elapsed_ms) {
            match event {
                GameEvent::Sound(cue) => self.audio.play(cue),
                other => log::debug!("Game event: {:?}", other),
            }
        }

        self.input.end_frame();
    }

    fn acquire_surface(&mut self) -> Option<Frame> {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return None;
        }
        self.gpu
            .begin_frame()
            .map(|(output, view)| Frame { output, view })
    }

    fn draw(&mut self, frame: &mut Frame, clock: &GameClock) {
        draw::build_scene(&mut self.batch, &self.session, &self.tiles);
        self.mesh
            .upload(&self.gpu.device, &self.gpu.queue, &self.batch);

        self.camera
            .set_view_offset(Vec2::new(self.session.view_offset_x(self.camera_margin), 0.0));
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );

        let stats = self.hud_stats();
        let (hud_primitives, hud_textures_delta) = self.hud.prepare(&self.window, clock, &stats);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            if !self.batch.is_empty() {
                render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(
                    self.mesh.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );

                let mut last_bound = None;
                for draw in &self.batch.draw_calls {
                    let Some(texture) = self.textures.get(draw.texture as usize) else {
                        log::warn!("Draw call references unknown texture #{}", draw.texture);
                        continue;
                    };
                    if last_bound != Some(draw.texture) {
                        render_pass.set_bind_group(1, &texture.bind_group, &[]);
                        last_bound = Some(draw.texture);
                    }
                    render_pass.draw_indexed(
                        draw.index_start..(draw.index_start + draw.index_count),
                        0,
                        0..1,
                    );
                }
            }
        }

        self.hud.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &hud_primitives,
            &hud_textures_delta,
            &screen_descriptor,
        );

        {
            let mut hud_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("HUD Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.hud
                .paint(&mut hud_pass, &hud_primitives, &screen_descriptor);
        }

        self.hud.cleanup(&hud_textures_delta);
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    fn present(&mut self, frame: Frame) {
        frame.output.present();
    }
}

struct App {
    resources: Option<GameResources>,
    shell: LoopShell,
    host: Option<GameHost>,
    next_frame: Instant,
    failed: bool,
}

impl App {
    fn new(resources: GameResources) -> Self {
        let shell = LoopShell::new(resources.config.game_loop.clone());
        Self {
            resources: Some(resources),
            shell,
            host: None,
            next_frame: Instant::now(),
            failed: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, message: &str) {
        log::error!("{}", message);
        self.failed = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }
        let Some(resources) = self.resources.take() else {
            return;
        };

        let platform = resources.config.display.platform_config();
        let window = match create_window(event_loop, &platform) {
            Ok(window) => window,
            Err(err) => {
                self.fail(event_loop, &format!("Failed to create window: {err}"));
                return;
            }
        };

        let mut host = match GameHost::new(window, resources) {
            Ok(host) => host,
            Err(err) => {
                self.fail(event_loop, &format!("Failed to initialise GPU: {err}"));
                return;
            }
        };
        self.shell.start(&mut host);
        self.next_frame = Instant::now();
        self.host = Some(host);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(host) = &self.host else {
            return;
        };
        if Instant::now() >= self.next_frame {
            host.window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        let hud_consumed = host.hud.handle_window_event(&host.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                self.shell.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                host.resize(physical_size.width, physical_size.height);
            }

            WindowEvent::KeyboardInput { event, .. } if !hud_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        let key_event = match (event.state, event.repeat) {
                            (ElementState::Pressed, false) => KeyEvent::pressed(key),
                            (ElementState::Pressed, true) => KeyEvent::repeated(key),
                            (ElementState::Released, _) => KeyEvent::released(key),
                        };
                        host.events.push(key_event);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if !self.shell.run_frame(host) {
                    log::info!(
                        "Game loop finished after {} frames ({:.1} fps)",
                        self.shell.clock().frame_count,
                        self.shell.fps()
                    );
                    event_loop.exit();
                    return;
                }
                self.next_frame = Instant::now() + self.shell.nap();
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F5 => Some(Key::F5),
        KeyCode::Digit1 => Some(Key::Digit(1)),
        KeyCode::Digit2 => Some(Key::Digit(2)),
        KeyCode::Digit3 => Some(Key::Digit(3)),
        KeyCode::Digit4 => Some(Key::Digit(4)),
        KeyCode::Digit5 => Some(Key::Digit(5)),
        KeyCode::Digit6 => Some(Key::Digit(6)),
        KeyCode::Digit7 => Some(Key::Digit(7)),
        KeyCode::Digit8 => Some(Key::Digit(8)),
        KeyCode::Digit9 => Some(Key::Digit(9)),
        _ => None,
    }
}

/// The surface is sRGB, so the configured 0-255 colour is linearised for the clear.
fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Tile Hopper starting...");

    let root = PathBuf::from(ASSET_ROOT);
    let resources = match load_resources(&root) {
        Ok(resources) => resources,
        Err(err) => {
            log::error!("Startup failed: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new(resources);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", err);
        return ExitCode::FAILURE;
    }

    if app.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
