//! Tileable noise field
//!
//! CPU-side mirror of the noise texture the flame shader samples. Lookups
//! wrap on both axes exactly like a sampler with `AddressMode::Repeat`, so
//! the scroll offset can grow without bound and never shows a seam.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Single-channel noise image with values in [0, 1]
#[derive(Debug, Clone)]
pub struct NoiseField {
    width: u32,
    height: u32,
    texels: Vec<f32>,
}

impl NoiseField {
    /// Builds a field from 8-bit luminance texels, row-major.
    ///
    /// Returns `None` when the dimensions are zero or do not match the data.
    pub fn from_luma8(width: u32, height: u32, data: &[u8]) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != (width * height) as usize {
            return None;
        }
        let texels = data.iter().map(|&v| v as f32 / 255.0).collect();
        Some(Self {
            width,
            height,
            texels,
        })
    }

    /// Generates tileable fractal value noise.
    ///
    /// Every octave uses a lattice that wraps at the image border, so the
    /// result repeats seamlessly with period 1.0 in UV space.
    pub fn generate(size: u32, base_cells: u32, octaves: u32, seed: u64) -> Self {
        let size = size.max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut texels = vec![0.0f32; (size * size) as usize];
        let mut amplitude = 0.5;
        let mut total_amplitude = 0.0;

        for octave in 0..octaves.max(1) {
            let cells = (base_cells.max(1) << octave).min(size);
            let lattice: Vec<f32> = (0..cells * cells).map(|_| rng.random::<f32>()).collect();

            for y in 0..size {
                for x in 0..size {
                    let u = x as f32 / size as f32 * cells as f32;
                    let v = y as f32 / size as f32 * cells as f32;
                    let value = lattice_value(&lattice, cells, u, v);
                    texels[(y * size + x) as usize] += value * amplitude;
                }
            }

            total_amplitude += amplitude;
            amplitude *= 0.5;
        }

        for texel in texels.iter_mut() {
            *texel /= total_amplitude;
        }

        Self {
            width: size,
            height: size,
            texels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel at integer coordinates, wrapping in both directions.
    pub fn texel(&self, x: i64, y: i64) -> f32 {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        self.texels[y * self.width as usize + x]
    }

    /// Bilinear sample at UV coordinates with repeat addressing.
    ///
    /// UV period is 1.0 on both axes; texel centers sit at half-texel offsets
    /// to match GPU sampling.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        if !u.is_finite() || !v.is_finite() {
            return 0.5;
        }
        let u = u - u.floor();
        let v = v - v.floor();
        let x = u * self.width as f32 - 0.5;
        let y = v * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = lerp(self.texel(x0, y0), self.texel(x0 + 1, y0), fx);
        let bottom = lerp(self.texel(x0, y0 + 1), self.texel(x0 + 1, y0 + 1), fx);
        lerp(top, bottom, fy)
    }

    /// Expands to RGBA8 (luminance replicated, opaque alpha) for upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.texels
            .iter()
            .flat_map(|&v| {
                let l = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                [l, l, l, 255]
            })
            .collect()
    }
}

fn lattice_value(lattice: &[f32], cells: u32, u: f32, v: f32) -> f32 {
    let x0 = u.floor();
    let y0 = v.floor();
    let fx = smoothstep(u - x0);
    let fy = smoothstep(v - y0);
    let cells_i = cells as i64;
    let at = |x: i64, y: i64| {
        let x = x.rem_euclid(cells_i) as usize;
        let y = y.rem_euclid(cells_i) as usize;
        lattice[y * cells as usize + x]
    };
    let (x0, y0) = (x0 as i64, y0 as i64);
    let top = lerp(at(x0, y0), at(x0 + 1, y0), fx);
    let bottom = lerp(at(x0, y0 + 1), at(x0 + 1, y0 + 1), fx);
    lerp(top, bottom, fy)
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_values_in_unit_range() {
        let field = NoiseField::generate(32, 4, 3, 7);
        for y in 0..32 {
            for x in 0..32 {
                let value = field.texel(x, y);
                assert!((0.0..=1.0).contains(&value), "texel {value} out of range");
            }
        }
    }

    #[test]
    fn test_sample_repeats_with_unit_period() {
        let field = NoiseField::generate(64, 4, 4, 42);
        // Scroll offsets grow without bound in the shader.
        let scrolls = [0.0, 1.0, 3.0, -2.0, 1024.0];

        // Dyadic coordinates survive `x + n - floor` exactly, so these repeat bit for bit.
        let exact = [(0.25, 0.5), (0.0, 0.0), (0.8125, 0.125), (0.5, 0.96875)];
        for &(u, v) in &exact {
            for &scroll in &scrolls {
                let base = field.sample(u, v - scroll);
                assert_eq!(base, field.sample(u + 1.0, v - scroll));
                assert_eq!(base, field.sample(u, v - scroll + 1.0));
            }
        }

        // Other values pick up rounding when shifted, worst near 1024, a small
        // fraction of a texel. Bilinear slope is at most one per texel.
        let tolerance = 1.0 / field.width() as f32;
        let ordinary = [(0.3, 0.7), (0.123, 0.456), (0.71, 0.05), (0.999, 0.333)];
        for &(u, v) in &ordinary {
            for &scroll in &scrolls {
                let base = field.sample(u, v - scroll);
                let shifted_u = field.sample(u + 1.0, v - scroll);
                let shifted_v = field.sample(u, v - scroll + 1.0);
                assert!((base - shifted_u).abs() <= tolerance, "u = {u}, scroll = {scroll}");
                assert!((base - shifted_v).abs() <= tolerance, "v = {v}, scroll = {scroll}");
            }
        }
    }

    #[test]
    fn test_texel_wraps_negative_indices() {
        let field = NoiseField::from_luma8(2, 2, &[0, 64, 128, 255]).unwrap();
        assert_eq!(field.texel(-1, 0), field.texel(1, 0));
        assert_eq!(field.texel(0, -1), field.texel(0, 1));
        assert_eq!(field.texel(2, 2), field.texel(0, 0));
    }

    #[test]
    fn test_generation_is_seeded() {
        let a = NoiseField::generate(16, 2, 2, 99);
        let b = NoiseField::generate(16, 2, 2, 99);
        assert_eq!(a.to_rgba8(), b.to_rgba8());
    }

    #[test]
    fn test_from_luma8_rejects_mismatched_data() {
        assert!(NoiseField::from_luma8(0, 4, &[]).is_none());
        assert!(NoiseField::from_luma8(2, 2, &[1, 2, 3]).is_none());
    }

    #[test]
    fn test_non_finite_coordinates_sample_neutral() {
        let field = NoiseField::generate(8, 2, 1, 1);
        assert_eq!(field.sample(f32::NAN, 0.0), 0.5);
        assert_eq!(field.sample(0.0, f32::INFINITY), 0.5);
    }
}
