use crate::render::overlay;
use crate::render::{FrameSnapshot, Viewport};
use egui_winit::winit::event::WindowEvent;
use winit::window::Window;

pub struct EguiFrameOutput {
    pub clipped_primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
    pub screen_size_px: [u32; 2],
    /// Pointer or keyboard focus sits in the panel, so the viewport must
    /// ignore the matching input until the next frame.
    pub wants_pointer_input: bool,
    pub wants_keyboard_input: bool,
}

impl EguiFrameOutput {
    /// Moves the tessellated panel into the frame the presenter draws.
    pub fn attach_to(self, frame: &mut FrameSnapshot) {
        frame.ui = self.clipped_primitives;
        frame.ui_textures = self.textures_delta;
        frame.pixels_per_point = self.pixels_per_point;
        frame.screen_size_px = self.screen_size_px;
    }
}

/// Owns the egui context and its winit bridge for the editor window.
pub struct EguiHost {
    context: egui::Context,
    winit_state: egui_winit::State,
}

impl EguiHost {
    pub fn new(window: &Window) -> Self {
        let context = egui::Context::default();
        let winit_state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        Self {
            context,
            winit_state,
        }
    }

    /// Returns whether egui consumed the event.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    pub fn copy_text(&self, text: String) {
        self.context.copy_text(text);
    }

    /// Runs the panel pass. The viewport wireframe of `frame` is painted
    /// into the background layer first so panels stay on top of it.
    pub fn run_ui<F>(
        &mut self,
        window: &Window,
        frame: &FrameSnapshot,
        viewport: Viewport,
        mut run_ui: F,
    ) -> EguiFrameOutput
    where
        F: FnMut(&egui::Context),
    {
        let shapes = overlay::viewport_shapes(frame, viewport);
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.context.run(raw_input, |ctx| {
            let clip = egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(viewport.width, viewport.height),
            );
            ctx.layer_painter(egui::LayerId::background())
                .with_clip_rect(clip)
                .extend(shapes.iter().cloned());
            run_ui(ctx);
        });
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, pixels_per_point);
        let size = window.inner_size();

        EguiFrameOutput {
            clipped_primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point,
            screen_size_px: [size.width.max(1), size.height.max(1)],
            wants_pointer_input: self.context.wants_pointer_input(),
            wants_keyboard_input: self.context.wants_keyboard_input(),
        }
    }
}
