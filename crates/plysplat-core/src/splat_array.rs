use byteorder::{ByteOrder, LittleEndian};

use crate::math_utils::{sh_component_count_for_degree, MAX_SH_DEGREE};
use crate::splat_layout::SplatLayout;

/// Scale assigned to splats whose source declares no scale fields.
pub const DEFAULT_SCALE: f32 = 0.01;

/// Opacity assigned to splats whose source declares no opacity field.
pub const DEFAULT_OPACITY: u8 = 255;

/// A fully reconstructed, renderer-ready splat.
#[derive(Debug, Clone, PartialEq)]
pub struct UncompressedSplat {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    /// Unit quaternion in `(x, y, z, w)` order.
    pub rotation: [f32; 4],
    pub color: [u8; 3],
    pub opacity: u8,
    /// Interleaved harmonics coefficients, length 0, 9 or 24.
    pub harmonics: Vec<f32>,
}

impl UncompressedSplat {
    /// Creates an empty splat sized for `sh_degree`.
    pub fn new(sh_degree: u8) -> Self {
        Self {
            position: [0.0; 3],
            scale: [DEFAULT_SCALE; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            color: [0; 3],
            opacity: DEFAULT_OPACITY,
            harmonics: vec![0.0; sh_component_count_for_degree(sh_degree)],
        }
    }

    /// Color and opacity as one RGBA quadruple.
    pub fn rgba(&self) -> [u8; 4] {
        [self.color[0], self.color[1], self.color[2], self.opacity]
    }

    /// Writes this splat into `out` following `layout`.
    ///
    /// `out` must be at least `layout.bytes_per_splat()` long. Harmonics are
    /// written only up to the layout's component count.
    pub fn write_packed(&self, layout: &SplatLayout, out: &mut [u8]) {
        let center = layout.center_offset();
        LittleEndian::write_f32_into(&self.position, &mut out[center..center + 12]);

        let scale = layout.scale_offset();
        LittleEndian::write_f32_into(&self.scale, &mut out[scale..scale + 12]);

        let rotation = layout.rotation_offset();
        LittleEndian::write_f32_into(&self.rotation, &mut out[rotation..rotation + 16]);

        let color = layout.color_offset();
        out[color..color + 4].copy_from_slice(&self.rgba());

        let count = layout.sh_component_count().min(self.harmonics.len());
        if count > 0 {
            let sh = layout.sh_offset();
            LittleEndian::write_f32_into(&self.harmonics[..count], &mut out[sh..sh + count * 4]);
        }
    }
}

/// Growable collection of canonical splats sharing one harmonics degree.
#[derive(Debug, Clone, Default)]
pub struct SplatArray {
    sh_degree: u8,
    splats: Vec<UncompressedSplat>,
}

impl SplatArray {
    pub fn new(sh_degree: u8) -> Self {
        Self {
            sh_degree: sh_degree.min(MAX_SH_DEGREE),
            splats: Vec::new(),
        }
    }

    pub fn with_capacity(sh_degree: u8, capacity: usize) -> Self {
        Self {
            sh_degree: sh_degree.min(MAX_SH_DEGREE),
            splats: Vec::with_capacity(capacity),
        }
    }

    pub fn sh_degree(&self) -> u8 {
        self.sh_degree
    }

    /// Creates an empty splat sized for this array's degree.
    pub fn create_splat(&self) -> UncompressedSplat {
        UncompressedSplat::new(self.sh_degree)
    }

    /// Appends a populated splat and returns its index.
    ///
    /// The splat's harmonics are truncated or zero-padded to this array's
    /// degree, so every stored splat has exactly 0, 9 or 24 coefficients.
    pub fn add_splat(&mut self, mut splat: UncompressedSplat) -> usize {
        splat
            .harmonics
            .resize(sh_component_count_for_degree(self.sh_degree), 0.0);
        self.splats.push(splat);
        self.splats.len() - 1
    }

    pub fn splat_count(&self) -> usize {
        self.splats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    pub fn splat(&self, index: usize) -> Option<&UncompressedSplat> {
        self.splats.get(index)
    }

    pub fn splats(&self) -> &[UncompressedSplat] {
        &self.splats
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UncompressedSplat> {
        self.splats.iter()
    }

    /// Packs every splat into a fresh uncompressed buffer.
    pub fn to_packed_buffer(&self) -> Vec<u8> {
        let layout = SplatLayout::uncompressed(self.sh_degree);
        let stride = layout.bytes_per_splat();
        let mut out = Vec::new();
        for splat in &self.splats {
            let start = out.len();
            out.resize(start + stride, 0);
            splat.write_packed(&layout, &mut out[start..]);
        }
        out
    }
}

impl<'a> IntoIterator for &'a SplatArray {
    type Item = &'a UncompressedSplat;
    type IntoIter = std::slice::Iter<'a, UncompressedSplat>;

    fn into_iter(self) -> Self::IntoIter {
        self.splats.iter()
    }
}
