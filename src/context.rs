//! Editor-wide state shared by the registry, the UI adapter and the frame loop.

use crate::assets::{EnvironmentMap, LoadQueue, TextureStore};
use crate::config::EditorConfig;
use crate::engine::{
    hex_to_rgb, Geometry, Layer, Node, NodeId, PrimitiveShape, SceneGraph, StandardMaterial,
    Transform,
};
use crate::render::{
    CameraRig, FrameEnvironment, FrameSnapshot, OrbitController, TransformGizmo, Viewport,
};
use glam::Vec3;
use std::time::{Duration, Instant};

pub const GRID_SIZE: f32 = 20.0;
pub const GRID_DIVISIONS: u32 = 20;
pub const GROUND_COLOR: u32 = 0x222222;

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub background: [f32; 3],
    pub ambient_intensity: f32,
    pub fog_enabled: bool,
    pub fog_density: f32,
    pub shadows: bool,
    pub environment_intensity: f32,
}

impl SceneSettings {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            background: hex_to_rgb(config.background),
            ambient_intensity: 0.5,
            fog_enabled: false,
            fog_density: config.fog_density,
            shadows: true,
            environment_intensity: 1.0,
        }
    }
}

/// Bottom status text: the current selection plus short-lived messages.
#[derive(Debug, Clone)]
pub struct StatusLine {
    selection: String,
    flash: Option<(String, Instant)>,
    duration: Duration,
}

impl StatusLine {
    pub fn new(duration: Duration) -> Self {
        Self {
            selection: "Selected: None".to_string(),
            flash: None,
            duration,
        }
    }

    pub fn set_selection(&mut self, name: Option<&str>) {
        self.selection = match name {
            Some(name) => format!("Selected: {name}"),
            None => "Selected: None".to_string(),
        };
    }

    pub fn flash(&mut self, message: impl Into<String>, now: Instant) {
        self.flash = Some((message.into(), now + self.duration));
    }

    /// Flash message while it lasts, selection text otherwise.
    pub fn text(&self, now: Instant) -> &str {
        match &self.flash {
            Some((message, until)) if now < *until => message,
            _ => &self.selection,
        }
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }
}

/// Grid and ground plane. Drawn, never picked or registered.
#[derive(Debug, Clone, Copy)]
pub struct Fixtures {
    pub grid: NodeId,
    pub ground: NodeId,
}

pub struct EditorContext {
    pub scene: SceneGraph,
    pub camera: CameraRig,
    pub orbit: OrbitController,
    pub gizmo: TransformGizmo,
    pub textures: TextureStore,
    pub loads: LoadQueue,
    pub settings: SceneSettings,
    pub environment: Option<EnvironmentMap>,
    pub status: StatusLine,
    pub fixtures: Fixtures,
    pub config: EditorConfig,
    viewport: Viewport,
}

impl EditorContext {
    pub fn new(config: EditorConfig) -> Self {
        let viewport = Viewport::new(
            config.window_width as f32 - config.side_panel_width,
            config.window_height as f32,
        );
        let mut scene = SceneGraph::new();
        let fixtures = add_fixtures(&mut scene);

        let mut camera = CameraRig::new(config.camera_params(), viewport);
        camera.position = Vec3::from_array(config.camera_position);
        let mut gizmo = TransformGizmo::new(config.gizmo_size);
        gizmo.set_enabled(config.transform_enabled);

        Self {
            scene,
            camera,
            orbit: OrbitController::new(config.orbit_damping),
            gizmo,
            textures: TextureStore::new(),
            loads: LoadQueue::new(),
            settings: SceneSettings::from_config(&config),
            environment: None,
            status: StatusLine::new(config.status_duration()),
            fixtures,
            config,
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.resize(viewport);
    }

    pub fn frame_environment(&self) -> FrameEnvironment {
        FrameEnvironment {
            background: self.settings.background,
            ambient_intensity: self.settings.ambient_intensity,
            fog_density: self
                .settings
                .fog_enabled
                .then_some(self.settings.fog_density),
            shadows: self.settings.shadows,
            environment_intensity: self
                .environment
                .as_ref()
                .map(|_| self.settings.environment_intensity),
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(&self.scene, &self.camera, &self.gizmo, self.frame_environment())
    }
}

fn add_fixtures(scene: &mut SceneGraph) -> Fixtures {
    let grid = scene.add_to_root(
        Node::mesh(
            "Grid",
            Geometry::Grid {
                size: GRID_SIZE,
                divisions: GRID_DIVISIONS,
            },
            StandardMaterial::with_color(hex_to_rgb(0x444444)),
        )
        .with_layer(Layer::Helper),
    );

    let mut ground_material = StandardMaterial::with_color(hex_to_rgb(GROUND_COLOR));
    ground_material.roughness = 1.0;
    ground_material.metalness = 0.0;
    let mut ground = Node::mesh(
        "Ground",
        Geometry::Primitive(PrimitiveShape::Plane),
        ground_material,
    )
    .with_layer(Layer::Helper)
    .with_transform(Transform {
        position: Vec3::new(0.0, -0.01, 0.0),
        rotation: Vec3::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
        scale: Vec3::new(GRID_SIZE, GRID_SIZE, 1.0),
    });
    if let Some(mesh) = ground.as_mesh_mut() {
        mesh.cast_shadow = false;
        mesh.receive_shadow = true;
    }
    let ground = scene.add_to_root(ground);
    Fixtures { grid, ground }
}
