use super::TextureHandle;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MESH_COLOR: u32 = 0x0077ff;

/// Physically based material with the channels the editor can drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardMaterial {
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub wireframe: bool,
    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    pub normal_scale: f32,
    pub roughness_map: Option<TextureHandle>,
    pub metalness_map: Option<TextureHandle>,
    pub emissive: [f32; 3],
    pub emissive_map: Option<TextureHandle>,
    pub emissive_intensity: f32,
    pub transparent: bool,
    pub opacity: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::with_color(hex_to_rgb(DEFAULT_MESH_COLOR))
    }
}

impl StandardMaterial {
    pub fn with_color(color: [f32; 3]) -> Self {
        Self {
            color,
            metalness: 0.0,
            roughness: 1.0,
            wireframe: false,
            map: None,
            normal_map: None,
            normal_scale: 1.0,
            roughness_map: None,
            metalness_map: None,
            emissive: [0.0, 0.0, 0.0],
            emissive_map: None,
            emissive_intensity: 1.0,
            transparent: false,
            opacity: 1.0,
        }
    }

    pub fn has_any_map(&self) -> bool {
        self.map.is_some()
            || self.normal_map.is_some()
            || self.roughness_map.is_some()
            || self.metalness_map.is_some()
            || self.emissive_map.is_some()
    }
}

pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

pub fn rgb_to_hex(rgb: [f32; 3]) -> u32 {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(rgb[0]) << 16) | (channel(rgb[1]) << 8) | channel(rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_is_stable() {
        for hex in [0x000000, 0x0077ff, 0x111111, 0xffffff, 0x222222] {
            assert_eq!(rgb_to_hex(hex_to_rgb(hex)), hex);
        }
    }

    #[test]
    fn default_material_is_opaque_and_unmapped() {
        let material = StandardMaterial::default();
        assert_eq!(rgb_to_hex(material.color), DEFAULT_MESH_COLOR);
        assert!(!material.transparent);
        assert_eq!(material.opacity, 1.0);
        assert!(!material.has_any_map());
    }
}
