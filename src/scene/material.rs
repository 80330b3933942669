//! Texture slots and the material they derive.
//!
//! A mesh entry keeps the user-edited [`MaterialParams`] and an ordered list
//! of [`TextureSlot`]s. [`derive_material`] rebuilds the node material from
//! those two inputs alone, so re-running it never accumulates state.

use crate::engine::{StandardMaterial, TextureHandle};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureSlotId(pub(crate) u64);

impl fmt::Display for TextureSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tex-{}", self.0)
    }
}

/// Material channel a texture slot feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    Diffuse,
    Normal,
    Roughness,
    Metalness,
    Emissive,
}

impl TextureKind {
    pub const ALL: [TextureKind; 5] = [
        TextureKind::Diffuse,
        TextureKind::Normal,
        TextureKind::Roughness,
        TextureKind::Metalness,
        TextureKind::Emissive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "Diffuse",
            TextureKind::Normal => "Normal",
            TextureKind::Roughness => "Roughness",
            TextureKind::Metalness => "Metalness",
            TextureKind::Emissive => "Emissive",
        }
    }
}

pub const TEXTURE_INTENSITY_MAX: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureSlot {
    pub id: TextureSlotId,
    pub display_name: String,
    pub kind: TextureKind,
    /// 0..=2
    pub intensity: f32,
    /// 0..=1, only meaningful for diffuse slots
    pub opacity: f32,
    pub handle: TextureHandle,
    pub source_hash: String,
}

impl TextureSlot {
    pub fn new(
        id: TextureSlotId,
        display_name: String,
        handle: TextureHandle,
        source_hash: String,
    ) -> Self {
        Self {
            id,
            display_name,
            kind: TextureKind::Diffuse,
            intensity: 1.0,
            opacity: 1.0,
            handle,
            source_hash,
        }
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity.clamp(0.0, TEXTURE_INTENSITY_MAX);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}

/// Material values edited directly in the properties panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub wireframe: bool,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self::from_material(&StandardMaterial::default())
    }
}

impl MaterialParams {
    pub fn from_material(material: &StandardMaterial) -> Self {
        Self {
            color: material.color,
            metalness: material.metalness,
            roughness: material.roughness,
            wireframe: material.wireframe,
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            color: self.color.map(|channel| channel.clamp(0.0, 1.0)),
            metalness: self.metalness.clamp(0.0, 1.0),
            roughness: self.roughness.clamp(0.0, 1.0),
            wireframe: self.wireframe,
        }
    }
}

/// Rebuilds a material from the base parameters and the slot list.
///
/// Slots apply in order, so a later slot of the same kind wins its channel.
/// Any diffuse slot below full opacity turns on alpha blending at the lowest
/// such opacity.
pub fn derive_material(base: &MaterialParams, slots: &[TextureSlot]) -> StandardMaterial {
    let mut material = StandardMaterial::with_color(base.color);
    material.metalness = base.metalness;
    material.roughness = base.roughness;
    material.wireframe = base.wireframe;

    let mut diffuse_opacity: Option<f32> = None;
    for slot in slots {
        match slot.kind {
            TextureKind::Diffuse => {
                material.map = Some(slot.handle);
                if slot.opacity < 1.0 {
                    diffuse_opacity =
                        Some(diffuse_opacity.map_or(slot.opacity, |o: f32| o.min(slot.opacity)));
                }
            }
            TextureKind::Normal => {
                material.normal_map = Some(slot.handle);
                material.normal_scale = slot.intensity;
            }
            TextureKind::Roughness => {
                material.roughness_map = Some(slot.handle);
                material.roughness = slot.intensity;
            }
            TextureKind::Metalness => {
                material.metalness_map = Some(slot.handle);
                material.metalness = slot.intensity;
            }
            TextureKind::Emissive => {
                material.emissive_map = Some(slot.handle);
                material.emissive = [1.0, 1.0, 1.0];
                material.emissive_intensity = slot.intensity;
            }
        }
    }

    match diffuse_opacity {
        Some(opacity) => {
            material.transparent = true;
            material.opacity = opacity;
        }
        None => {
            material.transparent = false;
            material.opacity = 1.0;
        }
    }
    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn handles(count: usize) -> Vec<TextureHandle> {
        let mut map: SlotMap<TextureHandle, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn slot(id: u64, handle: TextureHandle, kind: TextureKind) -> TextureSlot {
        let mut slot = TextureSlot::new(TextureSlotId(id), format!("t{id}"), handle, String::new());
        slot.kind = kind;
        slot
    }

    #[test]
    fn derivation_is_idempotent() {
        let h = handles(3);
        let base = MaterialParams::default();
        let mut diffuse = slot(1, h[0], TextureKind::Diffuse);
        diffuse.set_opacity(0.4);
        let mut normal = slot(2, h[1], TextureKind::Normal);
        normal.set_intensity(1.5);
        let slots = vec![diffuse, normal, slot(3, h[2], TextureKind::Emissive)];

        let first = derive_material(&base, &slots);
        let second = derive_material(&base, &slots);
        assert_eq!(first, second);
        assert_eq!(first.normal_scale, 1.5);
        assert_eq!(first.emissive_map, Some(h[2]));
    }

    #[test]
    fn each_kind_feeds_its_channel() {
        let h = handles(5);
        let base = MaterialParams {
            color: [0.5, 0.5, 0.5],
            metalness: 0.1,
            roughness: 0.9,
            wireframe: true,
        };
        let mut roughness = slot(3, h[2], TextureKind::Roughness);
        roughness.set_intensity(0.25);
        let mut metalness = slot(4, h[3], TextureKind::Metalness);
        metalness.set_intensity(1.75);
        let slots = vec![
            slot(1, h[0], TextureKind::Diffuse),
            slot(2, h[1], TextureKind::Normal),
            roughness,
            metalness,
            slot(5, h[4], TextureKind::Emissive),
        ];
        let material = derive_material(&base, &slots);
        assert_eq!(material.map, Some(h[0]));
        assert_eq!(material.normal_map, Some(h[1]));
        assert_eq!(material.roughness_map, Some(h[2]));
        assert_eq!(material.roughness, 0.25);
        assert_eq!(material.metalness_map, Some(h[3]));
        assert_eq!(material.metalness, 1.75);
        assert_eq!(material.emissive_map, Some(h[4]));
        assert_eq!(material.emissive_intensity, 1.0);
        assert!(material.wireframe);
        assert_eq!(material.color, [0.5, 0.5, 0.5]);
        assert!(!material.transparent);
    }

    #[test]
    fn dropping_slots_restores_base_scalars() {
        let h = handles(1);
        let base = MaterialParams::default();
        let mut roughness = slot(1, h[0], TextureKind::Roughness);
        roughness.set_intensity(0.3);
        assert_eq!(derive_material(&base, &[roughness]).roughness, 0.3);
        let material = derive_material(&base, &[]);
        assert_eq!(material.roughness, base.roughness);
        assert!(material.roughness_map.is_none());
    }

    #[test]
    fn lowest_diffuse_opacity_wins() {
        let h = handles(3);
        let mut a = slot(1, h[0], TextureKind::Diffuse);
        a.set_opacity(0.8);
        let mut b = slot(2, h[1], TextureKind::Diffuse);
        b.set_opacity(0.3);
        let mut not_diffuse = slot(3, h[2], TextureKind::Normal);
        not_diffuse.set_opacity(0.1);
        let material = derive_material(&MaterialParams::default(), &[a, b, not_diffuse]);
        assert!(material.transparent);
        assert_eq!(material.opacity, 0.3);
        assert_eq!(material.map, Some(h[1]));
    }

    #[test]
    fn slot_setters_clamp_ranges() {
        let h = handles(1);
        let mut s = slot(1, h[0], TextureKind::Diffuse);
        s.set_intensity(5.0);
        s.set_opacity(-1.0);
        assert_eq!(s.intensity, TEXTURE_INTENSITY_MAX);
        assert_eq!(s.opacity, 0.0);
    }
}
