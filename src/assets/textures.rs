use super::AssetError;
use crate::engine::TextureHandle;
use sha2::{Digest, Sha256};
use slotmap::SlotMap;
use std::path::Path;

/// RGBA8 image decoded off the UI thread.
#[derive(Debug, Clone)]
pub struct DecodedTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub source_hash: String,
}

pub fn decode_texture_file(path: &Path) -> Result<DecodedTexture, AssetError> {
    let bytes = super::read_bytes(path)?;
    decode_texture_bytes(super::file_name(path, "texture"), &bytes)
}

pub fn decode_texture_bytes(name: String, bytes: &[u8]) -> Result<DecodedTexture, AssetError> {
    let image = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
        name: name.clone(),
        source,
    })?;
    let rgba = image.to_rgba8();
    Ok(DecodedTexture {
        name,
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
        source_hash: source_hash(bytes),
    })
}

pub fn source_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Owns decoded textures; materials refer to them through handles.
#[derive(Default)]
pub struct TextureStore {
    textures: SlotMap<TextureHandle, DecodedTexture>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self {
            textures: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, texture: DecodedTexture) -> TextureHandle {
        log::debug!(
            "Texture '{}' stored ({}x{})",
            texture.name,
            texture.width,
            texture.height
        );
        self.textures.insert(texture)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&DecodedTexture> {
        self.textures.get(handle)
    }

    /// Returns false when the handle was already released.
    pub fn release(&mut self, handle: TextureHandle) -> bool {
        self.textures.remove(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let buffer = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(buffer)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_to_rgba() {
        let bytes = png_bytes(3, 2);
        let texture = decode_texture_bytes("albedo.png".to_string(), &bytes).unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.rgba.len(), 3 * 2 * 4);
        assert_eq!(&texture.rgba[..4], &[200, 40, 40, 255]);
        assert_eq!(texture.source_hash.len(), 64);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_texture_bytes("broken.png".to_string(), b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn release_is_one_shot() {
        let mut store = TextureStore::new();
        let texture = decode_texture_bytes("a.png".to_string(), &png_bytes(1, 1)).unwrap();
        let handle = store.insert(texture);
        assert_eq!(store.len(), 1);
        assert!(store.release(handle));
        assert!(!store.release(handle));
        assert!(store.is_empty());
    }

    #[test]
    fn identical_sources_hash_identically() {
        let bytes = png_bytes(2, 2);
        assert_eq!(source_hash(&bytes), source_hash(&bytes));
        assert_ne!(source_hash(&bytes), source_hash(&png_bytes(2, 3)));
    }
}
