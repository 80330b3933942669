//! Editor-level view of the scene: registered entries, their materials, and
//! the two export formats.

pub mod export;
pub mod material;
pub mod registry;
pub mod serialization;

pub use material::{MaterialParams, TextureKind, TextureSlot, TextureSlotId};
pub use registry::{EntryId, EntryKind, LightParams, ObjectRegistry, SceneEntry, TransformEdit};
