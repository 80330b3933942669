pub mod environment;
pub mod loader;
pub mod model;
pub mod textures;

pub use environment::EnvironmentMap;
pub use loader::{LoadKind, LoadOutcome, LoadQueue, LoadTicket, Loaded};
pub use model::ImportedModel;
pub use textures::{DecodedTexture, TextureStore};

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse glTF {path}: {source}")]
    ParseGltf {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF {path} has no scene to import")]
    EmptyModel { path: String },
    #[error("failed to decode image {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported file type: {path}")]
    UnsupportedFormat { path: String },
    #[error("load worker exited before reporting")]
    WorkerGone,
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, AssetError> {
    std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// File name without directory or extension, used for display labels.
pub(crate) fn file_stem(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub(crate) fn file_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|value| value.to_str())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_drops_extension_and_directories() {
        assert_eq!(file_stem(Path::new("/tmp/models/helmet.glb"), "model"), "helmet");
        assert_eq!(file_stem(Path::new(""), "model"), "model");
        assert_eq!(file_name(Path::new("/tmp/wood.png"), "texture"), "wood.png");
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("scenepad_definitely_missing.bin");
        let err = read_bytes(&path).unwrap_err();
        assert!(err.to_string().contains("scenepad_definitely_missing.bin"));
    }
}
