use super::AssetError;
use image::ImageFormat;
use std::path::Path;

/// Equirectangular HDR image used as scene environment and background.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Linear RGB, row major.
    pub pixels: Vec<[f32; 3]>,
}

impl EnvironmentMap {
    /// Mean radiance, handy for a rough ambient estimate.
    pub fn average(&self) -> [f32; 3] {
        if self.pixels.is_empty() {
            return [0.0; 3];
        }
        let mut sum = [0.0f64; 3];
        for pixel in &self.pixels {
            for (acc, value) in sum.iter_mut().zip(pixel) {
                *acc += f64::from(*value);
            }
        }
        let count = self.pixels.len() as f64;
        sum.map(|value| (value / count) as f32)
    }
}

pub fn decode_environment_file(path: &Path) -> Result<EnvironmentMap, AssetError> {
    let is_hdr = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("hdr"));
    if !is_hdr {
        return Err(AssetError::UnsupportedFormat {
            path: path.display().to_string(),
        });
    }
    let bytes = super::read_bytes(path)?;
    decode_environment_bytes(super::file_name(path, "environment"), &bytes)
}

pub fn decode_environment_bytes(name: String, bytes: &[u8]) -> Result<EnvironmentMap, AssetError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Hdr).map_err(|source| {
        AssetError::Decode {
            name: name.clone(),
            source,
        }
    })?;
    let rgb = image.to_rgb32f();
    let (width, height) = rgb.dimensions();
    let pixels = rgb.pixels().map(|pixel| pixel.0).collect();
    Ok(EnvironmentMap {
        name,
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hdr_bytes() -> Vec<u8> {
        let buffer = image::Rgb32FImage::from_pixel(4, 2, image::Rgb([0.5, 1.0, 2.0]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb32F(buffer)
            .write_to(&mut bytes, ImageFormat::Hdr)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn decodes_radiance_hdr() {
        let map = decode_environment_bytes("studio.hdr".to_string(), &hdr_bytes()).unwrap();
        assert_eq!((map.width, map.height), (4, 2));
        assert_eq!(map.pixels.len(), 8);
        let average = map.average();
        assert!((average[2] - 2.0).abs() < 0.05);
    }

    #[test]
    fn rejects_non_hdr_extension() {
        let err = decode_environment_file(Path::new("sky.png")).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedFormat { .. }));
    }
}
