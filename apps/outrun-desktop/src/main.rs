use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use outrun_input::{PickController, PickMode, PickOutcome, PointerEvent, ndc_from_pixels};
use outrun_kernel::{DriveConfig, FrameScheduler, StandInAssets, Stage};
use outrun_render::{FrameSnapshot, RenderPipeline};
use outrun_render_wgpu::{OrbitCamera, WgpuRenderer};
use outrun_scene::{MeshIntersector, Scene};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "outrun-desktop", about = "Outrun drive scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML); defaults reproduce the stock scene
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep at most one object highlighted
    #[arg(long)]
    exclusive_pick: bool,
}

/// Adapts the wgpu renderer to the scheduler's pipeline interface for one
/// frame.
struct FramePass<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    view: &'a wgpu::TextureView,
    camera: &'a mut OrbitCamera,
    surface_size: (u32, u32),
    applied_size: &'a mut (u32, u32),
}

impl RenderPipeline for FramePass<'_> {
    fn resize_if_needed(&mut self) -> bool {
        if *self.applied_size == self.surface_size {
            return false;
        }
        *self.applied_size = self.surface_size;
        let (width, height) = self.surface_size;
        self.renderer.resize(self.device, width, height);
        true
    }

    fn update_projection(&mut self) {
        let (width, height) = self.surface_size;
        self.camera.set_viewport(width, height);
    }

    fn submit_frame(&mut self, scene: &Scene, frame: &FrameSnapshot) {
        self.renderer.render(
            self.device,
            self.queue,
            self.view,
            &self.camera.camera(),
            scene,
            &frame.uniforms,
        );
    }
}

/// Application state.
struct AppState {
    scene: Scene,
    scheduler: FrameScheduler,
    assets: StandInAssets,
    picker: PickController,
    camera: OrbitCamera,
    started: Instant,
    // Pointer state
    cursor: Option<Vec2>,
    orbiting: bool,
    last_pick: PickOutcome,
    show_panel: bool,
    applied_size: (u32, u32),
}

impl AppState {
    fn new(config: DriveConfig, mode: PickMode) -> Result<Self> {
        let mut scene = Scene::new();
        let handles = Stage::new(&config).build(&mut scene)?;
        let assets = StandInAssets::new(config.stand_in_delay);
        let scheduler = FrameScheduler::new(config, handles)?;
        Ok(Self {
            scene,
            scheduler,
            assets,
            picker: PickController::new(mode),
            camera: OrbitCamera::default(),
            started: Instant::now(),
            cursor: None,
            orbiting: false,
            last_pick: PickOutcome::Nothing,
            show_panel: true,
            applied_size: (0, 0),
        })
    }

    fn poll_assets(&mut self) {
        if self.assets.is_drained() {
            return;
        }
        let attached = self.scheduler.poll_assets(&mut self.assets, &mut self.scene);
        if attached > 0 {
            tracing::info!(attached, "assets attached");
        }
    }

    fn pointer(&mut self, event: PointerEvent) {
        let outcome = self
            .picker
            .handle(event, &self.camera.camera(), &mut self.scene, &MeshIntersector);
        if outcome != PickOutcome::Nothing {
            self.last_pick = outcome;
        }
    }

    fn cursor_moved(&mut self, position: Vec2, size: Vec2) {
        if let (Some(previous), true) = (self.cursor, self.orbiting) {
            let delta = position - previous;
            self.camera.orbit(delta.x, delta.y);
        }
        self.cursor = Some(position);
        self.pointer(PointerEvent::Move(ndc_from_pixels(position, size)));
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
            }
            KeyCode::Escape => {
                self.picker.clear(&mut self.scene);
                self.last_pick = PickOutcome::Nothing;
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let uniforms = self.scheduler.uniforms();
        let timer = self.scheduler.timer();
        let handles = self.scheduler.handles();

        egui::SidePanel::left("drive")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Outrun");
                ui.separator();
                ui.label(format!(
                    "Frame: {}  FPS: {:.0}",
                    self.scheduler.frame_count(),
                    timer.fps()
                ));
                ui.label(format!(
                    "dt avg {:.1} ms / max {:.1} ms",
                    timer.average() * 1000.0,
                    timer.max() * 1000.0
                ));
                ui.label(format!("Nodes: {}", self.scene.len()));
                ui.separator();

                ui.heading("Scroll");
                ui.label(format!("time: {:.2} s", uniforms.time));
                ui.label(format!("speed: {:.1}", uniforms.speed));
                ui.label(format!("scale: {:.1}", uniforms.scale));
                ui.label(format!("travel: {:.1}", uniforms.travel()));
                ui.separator();

                ui.heading("Assets");
                for (label, ready) in [
                    ("terrain", handles.terrain.is_ready()),
                    ("vehicle", handles.vehicle.is_ready()),
                    ("props", handles.props.is_ready()),
                ] {
                    ui.label(format!("{label}: {}", if ready { "ready" } else { "loading" }));
                }
                ui.separator();

                ui.heading("Picking");
                let mut mode = self.picker.mode();
                ui.radio_value(&mut mode, PickMode::ToggleInPlace, "Toggle in place");
                ui.radio_value(&mut mode, PickMode::Exclusive, "Exclusive");
                if mode != self.picker.mode() {
                    self.picker.set_mode(mode);
                }
                let picked = match self.last_pick {
                    PickOutcome::Highlighted(id) | PickOutcome::Cleared(id) => self
                        .scene
                        .get(id)
                        .map(|n| n.name.clone())
                        .unwrap_or_else(|| id.short()),
                    PickOutcome::Nothing => "-".into(),
                };
                let verb = match self.last_pick {
                    PickOutcome::Highlighted(_) => "lit",
                    PickOutcome::Cleared(_) => "cleared",
                    PickOutcome::Nothing => "none",
                };
                ui.label(format!("Last pick: {picked} ({verb})"));
                if ui.button("Clear highlight (Esc)").clicked() {
                    self.picker.clear(&mut self.scene);
                    self.last_pick = PickOutcome::Nothing;
                }

                ui.separator();
                ui.small("F1: Toggle panel | LMB click: Pick | LMB drag: Orbit | Wheel: Zoom");
            });
    }
}

/// Window plus every GPU object; created together on resume.
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
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Outrun")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
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
                label: Some("outrun_device"),
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
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
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

    fn size(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let state = &mut self.state;
        state.poll_assets();

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

        let raw_time = state.started.elapsed().as_secs_f64() * 1000.0;
        let mut pass = FramePass {
            renderer: &mut gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            view: &view,
            camera: &mut state.camera,
            surface_size: (gpu.config.width, gpu.config.height),
            applied_size: &mut state.applied_size,
        };
        if state.scheduler.tick(raw_time, &mut state.scene, &mut pass).is_none() {
            return;
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        {
            let egui_renderer = &mut gpu.egui_renderer;
            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(&gpu.device, &gpu.queue, *id, image_delta);
            }
            let mut encoder = gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("egui_encoder"),
                });
            egui_renderer.update_buffers(
                &gpu.device,
                &gpu.queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
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
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            gpu.queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
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
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
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
                self.state.scheduler.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let size = self.gpu.as_ref().map(Gpu::size).unwrap_or(Vec2::ZERO);
                self.state
                    .cursor_moved(Vec2::new(position.x as f32, position.y as f32), size);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.cursor = None;
                self.state.orbiting = false;
                self.state.pointer(PointerEvent::Leave);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                let pressed = btn_state == ElementState::Pressed;
                self.state.orbiting = pressed;
                self.state.pointer(if pressed {
                    PointerEvent::Down
                } else {
                    PointerEvent::Up
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.camera.zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
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

    tracing::info!("outrun-desktop starting");

    let config = match &cli.config {
        Some(path) => DriveConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => DriveConfig::default(),
    };
    let mode = if cli.exclusive_pick {
        PickMode::Exclusive
    } else {
        PickMode::ToggleInPlace
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(config, mode)?);
    event_loop.run_app(&mut app)?;

    Ok(())
}
