pub mod actions;
mod egui_host;
mod input;
mod timing;

use crate::config::EditorConfig;
use crate::context::EditorContext;
use crate::render::pick::{self, PickHit};
use crate::render::{GizmoMode, PickSystem, Presenter, Viewport, WgpuPresenter};
use crate::scene::registry::ObjectRegistry;
use crate::scene::serialization::save_scene_to_file;
use crate::ui::{UiState, UiView};
use actions::AppRequest;
use egui_host::EguiHost;
use input::{shortcut_for, PointerGesture, PointerState, Shortcut};
use timing::{FrameTiming, TitleStats};

use glam::Vec2;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::error::EventLoopError;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "scenepad";
/// Pixel scroll distance treated as one wheel notch.
const PIXELS_PER_LINE: f32 = 50.0;

pub struct App {
    window: Option<Arc<Window>>,
    egui: Option<EguiHost>,
    ctx: EditorContext,
    registry: ObjectRegistry,
    ui: UiState,
    picks: PickSystem,
    pointer: PointerState,
    presenter: Option<Box<dyn Presenter>>,
    timing: FrameTiming,
    ui_wants_pointer: bool,
    ui_wants_keyboard: bool,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(config: EditorConfig) -> Self {
        let mut ctx = EditorContext::new(config);
        let mut registry = ObjectRegistry::new();
        actions::bootstrap_default_scene(&mut ctx, &mut registry);
        Self {
            window: None,
            egui: None,
            ctx,
            registry,
            ui: UiState::new(),
            picks: PickSystem::new(),
            pointer: PointerState::default(),
            presenter: None,
            timing: FrameTiming::new(WINDOW_TITLE.to_string()),
            ui_wants_pointer: false,
            ui_wants_keyboard: false,
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let logical: LogicalSize<f32> = size.to_logical(scale_factor);
        let width = (logical.width - self.ctx.config.side_panel_width).max(1.0);
        let viewport = Viewport::new(width, logical.height.max(1.0));
        self.ctx.resize(viewport);
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.resize([size.width, size.height]);
        }
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(hz) = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz())
            .map(|millihz| millihz as f32 / 1000.0)
        {
            if hz > 1.0 {
                target = Duration::from_secs_f32(1.0 / hz);
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn in_viewport(&self, point: Vec2) -> bool {
        let viewport = self.ctx.viewport();
        point.x >= 0.0 && point.y >= 0.0 && point.x < viewport.width && point.y < viewport.height
    }

    fn handle_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::TransformMode(mode) => self.registry.set_transform_mode(&mut self.ctx, mode),
            Shortcut::DeleteSelection => {
                if let Some(id) = self.registry.selected_id() {
                    self.registry.remove(&mut self.ctx, id);
                }
            }
            Shortcut::ClearSelection => self.registry.select(&mut self.ctx, None),
        }
    }

    /// Primary press on a gizmo handle starts a drag. Scale drags are
    /// refused for lights.
    fn begin_gizmo_drag(&mut self) {
        let point = self.pointer.position;
        let hit = pick::resolve(
            &self.ctx.scene,
            &self.ctx.camera,
            self.ctx.viewport(),
            &self.ctx.gizmo,
            point,
        );
        let PickHit::GizmoAxis(axis) = hit else {
            return;
        };
        let scaling_light = self.ctx.gizmo.mode() == GizmoMode::Scale
            && self
                .registry
                .selected()
                .map_or(false, |entry| entry.kind().is_light());
        if scaling_light {
            return;
        }
        self.pointer.gizmo_drag = self.ctx.gizmo.begin_drag(axis);
    }

    fn handle_gesture(&mut self, gesture: PointerGesture) {
        match gesture {
            PointerGesture::Click(point) => self.picks.request_pick(point),
            PointerGesture::Orbit(delta) => self.ctx.orbit.rotate(delta),
            PointerGesture::Pan(delta) => self.ctx.orbit.pan(delta),
            PointerGesture::GizmoDrag(delta) => {
                let viewport = self.ctx.viewport();
                let ctx = &mut self.ctx;
                if ctx.gizmo.drag(&mut ctx.scene, &ctx.camera, viewport, delta) {
                    self.registry.sync_controls_from_selection(&self.ctx);
                }
            }
        }
    }

    fn resolve_pick(&mut self) {
        let Some(point) = self.picks.take_request() else {
            return;
        };
        let picked = self.registry.pick_at(&self.ctx, point).map(|entry| entry.id());
        self.registry.select(&mut self.ctx, picked);
    }

    fn handle_request(&mut self, request: AppRequest) {
        match request {
            AppRequest::OpenModel => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("glTF", &["gltf", "glb"])
                    .pick_file()
                {
                    self.ctx.loads.request_model(path);
                }
            }
            AppRequest::OpenEnvironment => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("HDR", &["hdr"])
                    .pick_file()
                {
                    self.ctx.loads.request_environment(path);
                }
            }
            AppRequest::OpenTexture(entry) => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "webp"])
                    .pick_file()
                {
                    self.ctx.loads.request_texture(entry, path);
                }
            }
            AppRequest::SaveScene(document) => {
                let Some(path) = rfd::FileDialog::new()
                    .add_filter("Scene JSON", &["json"])
                    .set_file_name("scene.json")
                    .save_file()
                else {
                    return;
                };
                if let Err(err) = save_scene_to_file(&document, &path) {
                    log::error!("Failed to export scene to {}: {err}", path.display());
                    self.ctx
                        .status
                        .flash(format!("Error exporting scene: {err}"), Instant::now());
                }
            }
            AppRequest::CopyText(text) => {
                if let Some(egui) = &self.egui {
                    egui.copy_text(text);
                }
            }
        }
    }

    fn render(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let now = Instant::now();
        let stats = TitleStats {
            entries: self.registry.len(),
            pending_loads: self.ctx.loads.pending_count(),
        };
        self.timing.update(&window, now, stats);

        for outcome in self.ctx.loads.drain() {
            actions::apply_load_outcome(&mut self.ctx, &mut self.registry, outcome, now);
        }
        self.resolve_pick();
        actions::process_gizmo_events(&mut self.ctx, &mut self.registry);
        if self.ctx.orbit.update(&mut self.ctx.camera) {
            self.registry.refresh_camera(&self.ctx);
        }
        let mut frame = self.ctx.snapshot();
        let viewport = self.ctx.viewport();

        let Some(egui) = self.egui.as_mut() else {
            return;
        };
        let view = UiView {
            panels: self.registry.panels(),
            selected: self.registry.selected_id(),
            settings: &self.ctx.settings,
            environment: self.ctx.environment.as_ref().map(|env| env.name.as_str()),
            status: self.ctx.status.text(now),
            pending_loads: self.ctx.loads.pending_count(),
        };
        let width = self.ctx.config.side_panel_width;
        let ui = &mut self.ui;
        let mut ui_actions = Vec::new();
        let output = egui.run_ui(&window, &frame, viewport, |egui_ctx| {
            ui_actions = ui.show(egui_ctx, &view, width);
        });
        self.ui_wants_pointer = output.wants_pointer_input;
        self.ui_wants_keyboard = output.wants_keyboard_input;

        for action in ui_actions {
            if let Some(request) =
                actions::apply_action(&mut self.ctx, &mut self.registry, action, now)
            {
                self.handle_request(request);
            }
        }
        output.attach_to(&mut frame);
        let Some(presenter) = self.presenter.as_mut() else {
            return;
        };
        let present_start = Instant::now();
        if let Err(err) = presenter.present(&frame) {
            log::error!("Present failed: {err}");
        }
        self.timing
            .set_present_ms(present_start.elapsed().as_secs_f32() * 1000.0);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(
                self.ctx.config.window_width,
                self.ctx.config.window_height,
            ))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let presenter = match pollster::block_on(WgpuPresenter::new(window.clone())) {
            Ok(presenter) => presenter,
            Err(err) => {
                log::error!("Failed to create presenter: {err}");
                event_loop.exit();
                return;
            }
        };
        self.presenter = Some(Box::new(presenter));
        self.egui = Some(EguiHost::new(&window));
        self.handle_resize(window.inner_size(), window.scale_factor());
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (&mut self.egui, &self.window) {
            (Some(egui), Some(window)) => egui.on_window_event(window, &event),
            _ => false,
        };
        let scale_factor = self
            .window
            .as_ref()
            .map(|window| window.scale_factor())
            .unwrap_or(1.0);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if consumed || self.ui_wants_keyboard || event.state != ElementState::Pressed {
                    return;
                }
                if let Some(shortcut) = shortcut_for(event.physical_key) {
                    self.handle_shortcut(shortcut);
                }
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size, scale_factor);
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(size) = self.window.as_ref().map(|window| window.inner_size()) {
                    self.handle_resize(size, scale_factor);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let point = Vec2::new(
                    (position.x / scale_factor) as f32,
                    (position.y / scale_factor) as f32,
                );
                if let Some(gesture) = self.pointer.moved(point) {
                    self.handle_gesture(gesture);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.ctx.gizmo.end_drag();
                self.pointer.reset();
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    let over_panel =
                        consumed || self.ui_wants_pointer || !self.in_viewport(self.pointer.position);
                    if over_panel {
                        return;
                    }
                    self.pointer.press(button);
                    if self.pointer.primary_down() {
                        self.begin_gizmo_drag();
                    }
                }
                ElementState::Released => {
                    self.ctx.gizmo.end_drag();
                    if let Some(gesture) = self.pointer.release(button) {
                        self.handle_gesture(gesture);
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                if consumed || self.ui_wants_pointer || !self.in_viewport(self.pointer.position) {
                    return;
                }
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.ctx.orbit.zoom(steps);
            }
            WindowEvent::RedrawRequested => self.render(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run(config: EditorConfig) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)
}
