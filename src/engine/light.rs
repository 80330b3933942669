use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

impl LightKind {
    pub const ALL: [LightKind; 3] = [LightKind::Directional, LightKind::Point, LightKind::Spot];

    pub fn label(self) -> &'static str {
        match self {
            LightKind::Directional => "Directional Light",
            LightKind::Point => "Point Light",
            LightKind::Spot => "Spot Light",
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            LightKind::Directional => "DirectionalLight",
            LightKind::Point => "PointLight",
            LightKind::Spot => "SpotLight",
        }
    }

    /// Where newly added lights of this kind are placed.
    pub fn default_position(self) -> [f32; 3] {
        match self {
            LightKind::Directional => [5.0, 5.0, 5.0],
            LightKind::Point => [0.0, 2.0, 0.0],
            LightKind::Spot => [0.0, 4.0, 2.0],
        }
    }
}

/// Light payload of a scene node. Position comes from the node transform;
/// directional and spot lights aim at the world origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightNode {
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
    pub cast_shadow: bool,
    /// Point/spot falloff distance, 0 means unlimited.
    pub distance: f32,
    /// Spot cone half-angle in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub shadow_map_size: u32,
}

impl LightNode {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            cast_shadow: true,
            distance: 0.0,
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            shadow_map_size: 1024,
        }
    }
}
