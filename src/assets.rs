//! Texture assets for the flame material
//!
//! Images are decoded on the CPU with the `image` crate, then uploaded into a
//! [`TextureRegistry`] which hands out [`TextureHandle`]s. A missing, broken or
//! oversized file never stops startup: the loader logs a warning and
//! substitutes a procedural image instead.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::flame::NoiseField;
use crate::gfx::resources::texture_resource::{SampledTextureOptions, TextureResource};

const PROCEDURAL_MATCAP_SIZE: u32 = 256;
const PROCEDURAL_NOISE_SIZE: u32 = 256;
const PROCEDURAL_NOISE_CELLS: u32 = 4;
const PROCEDURAL_NOISE_OCTAVES: u32 = 4;
const PROCEDURAL_NOISE_SEED: u64 = 0x5eed_f1a3;

/// Opaque reference to a texture owned by a [`TextureRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} has zero width or height")]
    Empty { path: PathBuf },
    #[error("{path} is {width}x{height}, larger than the device limit of {max}")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// Decoded RGBA8 pixels, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    /// Reads and decodes a PNG or JPEG file
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes, path)
    }

    /// Decodes in-memory image bytes; `path` is only used in errors
    pub fn decode(bytes: &[u8], path: &Path) -> Result<Self, AssetError> {
        let decoded = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::Empty {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Rejects images the GPU cannot hold in a single 2D texture
    pub fn check_fits(&self, path: &Path, max_dimension: u32) -> Result<(), AssetError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(AssetError::TooLarge {
                path: path.to_path_buf(),
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }

    /// A single pixel of one color
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }

    pub fn from_noise(field: &NoiseField) -> Self {
        Self {
            width: field.width(),
            height: field.height(),
            rgba: field.to_rgba8(),
        }
    }

    /// Soft grey studio matcap: a lit hemisphere with a faint rim
    pub fn procedural_matcap(size: u32) -> Self {
        let size = size.max(1);
        let light = normalize([-0.4, 0.6, 0.7]);
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);

        for row in 0..size {
            for col in 0..size {
                let nx = (col as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let ny = 1.0 - (row as f32 + 0.5) / size as f32 * 2.0;
                let r2 = (nx * nx + ny * ny).min(1.0);
                let nz = (1.0 - r2).sqrt();

                let diffuse = (nx * light[0] + ny * light[1] + nz * light[2]).max(0.0);
                let rim = (1.0 - nz).powi(3) * 0.35;
                let value = (0.18 + 0.72 * diffuse + rim).clamp(0.0, 1.0);
                let byte = (value * 255.0).round() as u8;
                rgba.extend_from_slice(&[byte, byte, byte, 255]);
            }
        }

        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    /// Red channel as a CPU noise field, matching what the shader samples
    pub fn to_noise_field(&self) -> Option<NoiseField> {
        let luma: Vec<u8> = self.rgba.chunks_exact(4).map(|px| px[0]).collect();
        NoiseField::from_luma8(self.width, self.height, &luma)
    }
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// What a flame texture is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureRole {
    Matcap,
    Noise,
}

impl TextureRole {
    pub fn label(self) -> &'static str {
        match self {
            TextureRole::Matcap => "Matcap",
            TextureRole::Noise => "Noise",
        }
    }

    pub fn options(self) -> SampledTextureOptions {
        match self {
            TextureRole::Matcap => SampledTextureOptions::color(),
            TextureRole::Noise => SampledTextureOptions::tiling_data(),
        }
    }

    /// Image bound when no texture is available at all
    pub fn fallback(self) -> ImageData {
        match self {
            TextureRole::Matcap => ImageData::solid([255, 255, 255, 255]),
            TextureRole::Noise => ImageData::solid([128, 128, 128, 255]),
        }
    }

    /// Image used when no file was given or the file failed to load
    pub fn procedural(self) -> ImageData {
        match self {
            TextureRole::Matcap => ImageData::procedural_matcap(PROCEDURAL_MATCAP_SIZE),
            TextureRole::Noise => ImageData::from_noise(&NoiseField::generate(
                PROCEDURAL_NOISE_SIZE,
                PROCEDURAL_NOISE_CELLS,
                PROCEDURAL_NOISE_OCTAVES,
                PROCEDURAL_NOISE_SEED,
            )),
        }
    }
}

/// Where a loaded image came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    File(PathBuf),
    Procedural,
}

impl AssetSource {
    /// Short form for the tuning panel: the file name, or "procedural"
    pub fn describe(&self) -> String {
        match self {
            AssetSource::File(path) => path
                .file_name()
                .unwrap_or(path.as_os_str())
                .to_string_lossy()
                .into_owned(),
            AssetSource::Procedural => "procedural".to_string(),
        }
    }
}

/// Loads the image for `role` from `path`, or generates one.
///
/// Files wider or taller than `max_dimension` texels are refused, since
/// uploading them would fail device validation.
pub fn load_or_generate(
    role: TextureRole,
    path: Option<&Path>,
    max_dimension: u32,
) -> (ImageData, AssetSource) {
    let Some(path) = path else {
        log::info!("{} texture: procedural", role.label());
        return (role.procedural(), AssetSource::Procedural);
    };

    let loaded = ImageData::load(path)
        .and_then(|image| image.check_fits(path, max_dimension).map(|()| image));
    match loaded {
        Ok(image) => {
            log::info!(
                "{} texture: {} ({}x{})",
                role.label(),
                path.display(),
                image.width,
                image.height
            );
            (image, AssetSource::File(path.to_path_buf()))
        }
        Err(err) => {
            log::warn!("{err}; using a procedural {} texture", role.label().to_lowercase());
            (role.procedural(), AssetSource::Procedural)
        }
    }
}

/// Owns uploaded textures and issues handles to them
#[derive(Default)]
pub struct TextureRegistry {
    textures: Vec<TextureResource>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        role: TextureRole,
        image: &ImageData,
    ) -> TextureHandle {
        let texture = TextureResource::create_from_rgba_data(
            device,
            queue,
            &image.rgba,
            image.width,
            image.height,
            &format!("{} Texture", role.label()),
            role.options(),
        );
        self.textures.push(texture);
        TextureHandle((self.textures.len() - 1) as u32)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureResource> {
        self.textures.get(handle.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, rgba: Vec<u8>) -> Vec<u8> {
        let image = image::RgbaImage::from_raw(width, height, rgba).unwrap();
        let mut bytes = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decode_png_to_rgba() {
        let pixels = vec![255, 0, 0, 255, 0, 255, 0, 255];
        let bytes = encode_png(2, 1, pixels.clone());

        let image = ImageData::decode(&bytes, Path::new("two.png")).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.rgba, pixels);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = ImageData::decode(b"not an image", Path::new("bad.png")).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
        assert!(err.to_string().contains("bad.png"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ImageData::load(Path::new("/nonexistent/flame/noise.png")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_missing_file_falls_back_to_procedural() {
        let (image, source) = load_or_generate(
            TextureRole::Noise,
            Some(Path::new("/nonexistent/noise.png")),
            4096,
        );
        assert_eq!(source, AssetSource::Procedural);
        assert_eq!(image.width, PROCEDURAL_NOISE_SIZE);
        assert_eq!(image.rgba.len(), (image.width * image.height * 4) as usize);
    }

    #[test]
    fn test_oversized_file_falls_back_to_procedural() {
        let path = std::env::temp_dir()
            .join(format!("flamesphere-oversized-{}.png", std::process::id()));
        std::fs::write(&path, encode_png(8, 2, vec![200; 8 * 2 * 4])).unwrap();

        let (image, source) = load_or_generate(TextureRole::Matcap, Some(&path), 4);
        assert_eq!(source, AssetSource::Procedural);
        assert_eq!(image.width, PROCEDURAL_MATCAP_SIZE);

        let (image, source) = load_or_generate(TextureRole::Matcap, Some(&path), 8);
        assert_eq!(source, AssetSource::File(path.clone()));
        assert_eq!((image.width, image.height), (8, 2));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_check_fits_limits_either_side() {
        let wide = ImageData {
            width: 5,
            height: 1,
            rgba: vec![0; 5 * 4],
        };
        let tall = ImageData {
            width: 1,
            height: 5,
            rgba: vec![0; 5 * 4],
        };
        for image in [&wide, &tall] {
            let err = image.check_fits(Path::new("big.png"), 4).unwrap_err();
            assert!(matches!(err, AssetError::TooLarge { max: 4, .. }));
            assert!(image.check_fits(Path::new("big.png"), 5).is_ok());
        }
    }

    #[test]
    fn test_source_description() {
        let file = AssetSource::File(PathBuf::from("/textures/matcap_red.png"));
        assert_eq!(file.describe(), "matcap_red.png");
        assert_eq!(AssetSource::Procedural.describe(), "procedural");
    }

    #[test]
    fn test_fallback_pixels() {
        assert_eq!(TextureRole::Matcap.fallback().rgba, vec![255, 255, 255, 255]);
        assert_eq!(TextureRole::Noise.fallback().rgba, vec![128, 128, 128, 255]);
    }

    #[test]
    fn test_noise_role_tiles() {
        let options = TextureRole::Noise.options();
        assert_eq!(options.address_mode, wgpu::AddressMode::Repeat);
        assert_eq!(options.format, wgpu::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn test_procedural_matcap_is_brighter_toward_light() {
        let image = ImageData::procedural_matcap(64);
        let at = |col: u32, row: u32| image.rgba[((row * 64 + col) * 4) as usize];
        // upper left faces the light, lower right faces away
        assert!(at(20, 20) > at(44, 44));
    }

    #[test]
    fn test_noise_image_round_trips_to_field() {
        let field = NoiseField::generate(16, 2, 2, 7);
        let image = ImageData::from_noise(&field);
        let back = image.to_noise_field().unwrap();
        assert_eq!((back.width(), back.height()), (16, 16));
        assert!((back.texel(3, 5) - field.texel(3, 5)).abs() < 1.0 / 255.0 + 1e-6);
    }
}
