//! Raw record to canonical splat conversion.
//!
//! Stored INRIA v1 values are training-space parameters: scales are
//! log-transformed, opacity is a logit and color is the DC term of a
//! spherical harmonics expansion. This module applies the matching
//! activations and fills defaults for fields the file does not declare.

use glam::DQuat;
use plysplat_core::math_utils::{
    log_scale_to_linear, opacity_logit_to_u8, sh_component_count_for_degree, sh_dc_to_u8,
    unit_to_u8,
};
use plysplat_core::splat_array::{UncompressedSplat, DEFAULT_OPACITY, DEFAULT_SCALE};
use plysplat_core::status::{PlyError, Result};

use crate::field::{FieldId, FieldSet};
use crate::header::PlyHeader;
use crate::row_reader::RawRecord;

/// Counters collected while decoding rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub rows: usize,
    /// Rows whose rotation was missing, zero-length or non-finite and was
    /// replaced by the identity quaternion.
    pub degenerate_rotations: usize,
}

impl DecodeStats {
    pub fn merge(&mut self, other: DecodeStats) {
        self.rows += other.rows;
        self.degenerate_rotations += other.degenerate_rotations;
    }
}

/// Converts one raw record into a canonical splat.
///
/// The produced harmonics degree is `min(sh_degree, header.sh_degree)`.
pub fn transform_record(
    raw: &RawRecord,
    header: &PlyHeader,
    sh_degree: u8,
    stats: &mut DecodeStats,
) -> Result<UncompressedSplat> {
    let mut splat = UncompressedSplat::new(header.clamp_sh_degree(sh_degree));
    transform_record_into(raw, header, sh_degree, &mut splat, stats)?;
    Ok(splat)
}

/// Like [`transform_record`], but overwrites `out` so its harmonics storage
/// can be reused across rows.
///
/// Which attributes exist is decided by the header's presence mask, once per
/// schema. A declared field whose slot in `raw` is unset reads as zero.
pub fn transform_record_into(
    raw: &RawRecord,
    header: &PlyHeader,
    sh_degree: u8,
    out: &mut UncompressedSplat,
    stats: &mut DecodeStats,
) -> Result<()> {
    let out_degree = header.clamp_sh_degree(sh_degree);
    let present = header.present();

    out.position = position(raw, &present)?;

    out.scale = match declared(raw, &present, FieldId::SCALE) {
        Some(scale) => scale.map(log_scale_to_linear),
        None => [DEFAULT_SCALE; 3],
    };

    out.color = if let Some(dc) = declared(raw, &present, FieldId::SH_DC) {
        dc.map(sh_dc_to_u8)
    } else if let Some(rgb) = declared(raw, &present, FieldId::RGB) {
        rgb.map(unit_to_u8)
    } else {
        [0; 3]
    };

    out.opacity = match declared(raw, &present, [FieldId::OPACITY]) {
        Some([opacity]) => opacity_logit_to_u8(opacity),
        None => DEFAULT_OPACITY,
    };

    let (rotation, degenerate) = normalized_rotation(declared(raw, &present, FieldId::ROTATION));
    out.rotation = rotation;
    if degenerate {
        stats.degenerate_rotations += 1;
    }

    out.harmonics.clear();
    out.harmonics
        .resize(sh_component_count_for_degree(out_degree), 0.0);
    if out_degree >= 1 && present.contains(FieldId::F_REST_0) {
        let rest = |id: &FieldId| raw.get(*id).unwrap_or(0.0);
        for (dst, id) in out.harmonics[..9]
            .iter_mut()
            .zip(&header.sh_degree1_field_ids)
        {
            *dst = rest(id);
        }
        if out_degree >= 2 {
            for (dst, id) in out.harmonics[9..]
                .iter_mut()
                .zip(&header.sh_degree2_field_ids)
            {
                *dst = rest(id);
            }
        }
    }

    stats.rows += 1;
    Ok(())
}

/// Values of `ids` when the schema declares all of them.
fn declared<const N: usize>(
    raw: &RawRecord,
    present: &FieldSet,
    ids: [FieldId; N],
) -> Option<[f32; N]> {
    if present.contains_all(&ids) {
        Some(ids.map(|id| raw.get(id).unwrap_or(0.0)))
    } else {
        None
    }
}

/// Fails with `PlyError::MissingField` naming the first undeclared
/// position component.
pub fn require_position(present: &FieldSet) -> Result<()> {
    for (id, name) in FieldId::POSITION.into_iter().zip(["x", "y", "z"]) {
        if !present.contains(id) {
            return Err(PlyError::MissingField(name));
        }
    }
    Ok(())
}

fn position(raw: &RawRecord, present: &FieldSet) -> Result<[f32; 3]> {
    require_position(present)?;
    Ok(FieldId::POSITION.map(|id| raw.get(id).unwrap_or(0.0)))
}

/// Normalizes `(rot_0, rot_1, rot_2, rot_3)` read as `(x, y, z, w)`.
///
/// Returns the identity and `true` when the rotation is missing, has zero
/// length or is not finite.
fn normalized_rotation(rotation: Option<[f32; 4]>) -> ([f32; 4], bool) {
    const IDENTITY: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    let Some([x, y, z, w]) = rotation else {
        return (IDENTITY, true);
    };
    let q = DQuat::from_xyzw(x as f64, y as f64, z as f64, w as f64);
    let length_squared = q.length_squared();
    if !length_squared.is_finite() || length_squared == 0.0 {
        return (IDENTITY, true);
    }
    let q = q.normalize();
    ([q.x as f32, q.y as f32, q.z as f32, q.w as f32], false)
}
