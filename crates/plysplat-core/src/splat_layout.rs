//! Byte layout of packed splat buffers.
//!
//! Downstream consumers read packed buffers by fixed offset, so every width
//! and sub-offset here is part of the output contract.

use crate::math_utils::{sh_component_count_for_degree, MAX_SH_DEGREE};

/// Per-splat byte layout for one compression tier and harmonics degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplatLayout {
    pub compression_level: u8,
    pub sh_degree: u8,
    pub bytes_per_center: usize,
    pub bytes_per_scale: usize,
    pub bytes_per_rotation: usize,
    pub bytes_per_color: usize,
    pub bytes_per_sh_component: usize,
}

impl SplatLayout {
    /// Layout of the uncompressed tier (level 0): all floats are 32-bit,
    /// color and opacity are four bytes.
    pub fn uncompressed(sh_degree: u8) -> Self {
        Self {
            compression_level: 0,
            sh_degree: sh_degree.min(MAX_SH_DEGREE),
            bytes_per_center: 12,
            bytes_per_scale: 12,
            bytes_per_rotation: 16,
            bytes_per_color: 4,
            bytes_per_sh_component: 4,
        }
    }

    pub fn sh_component_count(&self) -> usize {
        sh_component_count_for_degree(self.sh_degree)
    }

    pub fn center_offset(&self) -> usize {
        0
    }

    pub fn scale_offset(&self) -> usize {
        self.bytes_per_center
    }

    pub fn rotation_offset(&self) -> usize {
        self.scale_offset() + self.bytes_per_scale
    }

    pub fn color_offset(&self) -> usize {
        self.rotation_offset() + self.bytes_per_rotation
    }

    pub fn sh_offset(&self) -> usize {
        self.color_offset() + self.bytes_per_color
    }

    pub fn bytes_per_sh(&self) -> usize {
        self.sh_component_count() * self.bytes_per_sh_component
    }

    /// Total stride of one packed splat.
    pub fn bytes_per_splat(&self) -> usize {
        self.sh_offset() + self.bytes_per_sh()
    }

    /// Bytes needed to hold `count` packed splats, or `None` on overflow.
    pub fn buffer_len(&self, count: usize) -> Option<usize> {
        count.checked_mul(self.bytes_per_splat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncompressed_strides() {
        assert_eq!(SplatLayout::uncompressed(0).bytes_per_splat(), 44);
        assert_eq!(SplatLayout::uncompressed(1).bytes_per_splat(), 80);
        assert_eq!(SplatLayout::uncompressed(2).bytes_per_splat(), 140);
        assert_eq!(SplatLayout::uncompressed(3).sh_degree, 2);
    }

    #[test]
    fn test_sub_offsets() {
        let layout = SplatLayout::uncompressed(2);
        assert_eq!(layout.center_offset(), 0);
        assert_eq!(layout.scale_offset(), 12);
        assert_eq!(layout.rotation_offset(), 24);
        assert_eq!(layout.color_offset(), 40);
        assert_eq!(layout.sh_offset(), 44);
        assert_eq!(layout.buffer_len(3), Some(420));
        assert_eq!(layout.buffer_len(usize::MAX / 100), None);
    }
}
