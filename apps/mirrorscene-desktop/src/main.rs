use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use mirrorscene_assets::{ModelLoader, ModelSource, PendingModel};
use mirrorscene_common::{CUBE_SIZE_RANGE, FOV_RANGE, StageSettings};
use mirrorscene_input::{PointerButton, PointerTracker};
use mirrorscene_render_wgpu::WgpuRenderer;
use mirrorscene_stage::Stage;
use mirrorscene_tools::{FrameStats, SceneInspector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Pixels of touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 50.0;

#[derive(Parser)]
#[command(name = "mirrorscene-desktop", about = "Mirror sphere scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// glTF model to load (defaults to the built-in scene)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Initial vertical field of view in degrees
    #[arg(long)]
    fov: Option<f32>,

    /// Initial cube map edge length in pixels
    #[arg(long)]
    cube_size: Option<u32>,
}

impl Cli {
    fn settings(&self) -> Result<StageSettings> {
        let mut settings = match &self.config {
            Some(path) => StageSettings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => StageSettings::default(),
        };
        if let Some(model) = &self.model {
            settings.model = Some(model.clone());
        }
        if let Some(fov) = self.fov {
            settings.scene.set_fov(fov);
        }
        if let Some(size) = self.cube_size {
            settings.scene.set_cube_render_target_size(size);
        }
        Ok(settings)
    }
}

/// Application state.
struct AppState {
    stage: Stage,
    pointer: PointerTracker,
    pending_model: Option<PendingModel>,
    stats: FrameStats,
    show_panel: bool,
    last_frame: Instant,
    last_error: Option<String>,
}

impl AppState {
    fn new(settings: &StageSettings) -> Self {
        let stage = Stage::new(settings, (settings.window.width, settings.window.height));
        let source = ModelSource::from_path(settings.model.clone());
        tracing::info!("loading model {source}");
        Self {
            stage,
            pointer: PointerTracker::new(),
            pending_model: Some(ModelLoader::spawn(source)),
            stats: FrameStats::default(),
            show_panel: true,
            last_frame: Instant::now(),
            last_error: None,
        }
    }

    /// Install the model once the loader delivers it.
    fn poll_model(&mut self) {
        let Some(pending) = &mut self.pending_model else {
            return;
        };
        let Some(result) = pending.try_take() else {
            return;
        };
        let label = pending.label().to_string();
        self.pending_model = None;
        match result {
            Ok(model) => {
                let report = self.stage.install_model(model);
                tracing::info!(
                    "model {label} ready: {} meshes, mirror {}",
                    report.meshes,
                    if report.mirror.is_some() { "on" } else { "off" }
                );
            }
            Err(e) => tracing::error!("failed to load model {label}: {e}"),
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        egui::Window::new("Controls")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                let mut fov = self.stage.config().fov;
                if ui
                    .add(egui::Slider::new(&mut fov, FOV_RANGE).text("fov"))
                    .changed()
                {
                    self.stage.set_fov(fov);
                }

                let mut size = self.stage.config().cube_render_target_size;
                if ui
                    .add(egui::Slider::new(&mut size, CUBE_SIZE_RANGE).text("cubeRenderTargetSize"))
                    .changed()
                {
                    self.stage.set_cube_render_target_size(size);
                }

                ui.separator();
                ui.label(self.stats.to_string());
                ui.small(SceneInspector::summary(self.stage.scene()).to_string());
                if self.pending_model.is_some() {
                    ui.small("loading model...");
                }
            });
    }

    fn on_pointer_button(&mut self, button: MouseButton, state: ElementState) {
        let button = match button {
            MouseButton::Left => PointerButton::Left,
            MouseButton::Right => PointerButton::Right,
            MouseButton::Middle => PointerButton::Middle,
            _ => return,
        };
        self.pointer
            .on_button(button, state == ElementState::Pressed);
    }
}

/// Window, surface and GPU objects, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, size: PhysicalSize<u32>) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("mirrorscene")
            .with_inner_size(size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("mirrorscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Draw the egui overlay on top of `view`.
    fn paint_overlay(
        &mut self,
        egui_ctx: &EguiContext,
        view: &wgpu::TextureView,
        full_output: egui::FullOutput,
    ) {
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    initial_size: PhysicalSize<u32>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(settings: &StageSettings) -> Self {
        Self {
            state: AppState::new(settings),
            initial_size: PhysicalSize::new(settings.window.width, settings.window.height),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        self.state.stats.record(now - self.state.last_frame);
        self.state.last_frame = now;
        self.state.poll_model();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let result = self
            .state
            .stage
            .frame(&mut gpu.renderer.frame(&gpu.device, &gpu.queue, &view));
        match result {
            Ok(()) => self.state.last_error = None,
            Err(e) => {
                let message = e.to_string();
                if self.state.last_error.as_ref() != Some(&message) {
                    tracing::error!("frame failed: {message}");
                    self.state.last_error = Some(message);
                }
            }
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        gpu.paint_overlay(&self.egui_ctx, &view, full_output);

        for event in self.state.stage.drain_events() {
            tracing::debug!(?event, "stage event");
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx, self.initial_size) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.stage.resize(size.width, size.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
                self.state.stage.resize(new_size.width, new_size.height);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.state.on_pointer_button(button, state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                if let Some(action) = self.state.pointer.on_cursor_moved(position) {
                    self.state.stage.apply(action);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.reset();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                if let Some(action) = self.state.pointer.on_wheel(lines) {
                    self.state.stage.apply(action);
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key
                        == winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::F1) =>
            {
                self.state.show_panel = !self.state.show_panel;
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("mirrorscene-desktop starting");

    let settings = cli.settings()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(&settings);
    event_loop.run_app(&mut app)?;

    Ok(())
}
