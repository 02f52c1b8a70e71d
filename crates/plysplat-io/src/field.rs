//! Recognized vertex property names.
//!
//! Only these names carry meaning for the decoder. Each one maps to a stable
//! [`FieldId`] so per-row decoding indexes fixed tables instead of looking
//! names up.

use std::fmt;

/// Number of spherical harmonics rest coefficients that can be recognized
/// (degree 3 over three channels).
pub const MAX_REST_FIELDS: usize = 45;

/// Total number of recognized fields.
pub const FIELD_COUNT: usize = FieldId::F_REST_0.0 as usize + MAX_REST_FIELDS;

/// Stable id of a recognized vertex property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u8);

const CORE_NAMES: [&str; 17] = [
    "x", "y", "z", "scale_0", "scale_1", "scale_2", "rot_0", "rot_1", "rot_2", "rot_3", "f_dc_0",
    "f_dc_1", "f_dc_2", "opacity", "red", "green", "blue",
];

impl FieldId {
    pub const X: FieldId = FieldId(0);
    pub const Y: FieldId = FieldId(1);
    pub const Z: FieldId = FieldId(2);
    pub const SCALE_0: FieldId = FieldId(3);
    pub const SCALE_1: FieldId = FieldId(4);
    pub const SCALE_2: FieldId = FieldId(5);
    pub const ROT_0: FieldId = FieldId(6);
    pub const ROT_1: FieldId = FieldId(7);
    pub const ROT_2: FieldId = FieldId(8);
    pub const ROT_3: FieldId = FieldId(9);
    pub const F_DC_0: FieldId = FieldId(10);
    pub const F_DC_1: FieldId = FieldId(11);
    pub const F_DC_2: FieldId = FieldId(12);
    pub const OPACITY: FieldId = FieldId(13);
    pub const RED: FieldId = FieldId(14);
    pub const GREEN: FieldId = FieldId(15);
    pub const BLUE: FieldId = FieldId(16);
    pub const F_REST_0: FieldId = FieldId(17);

    pub const POSITION: [FieldId; 3] = [FieldId::X, FieldId::Y, FieldId::Z];
    pub const SCALE: [FieldId; 3] = [FieldId::SCALE_0, FieldId::SCALE_1, FieldId::SCALE_2];
    pub const ROTATION: [FieldId; 4] =
        [FieldId::ROT_0, FieldId::ROT_1, FieldId::ROT_2, FieldId::ROT_3];
    pub const SH_DC: [FieldId; 3] = [FieldId::F_DC_0, FieldId::F_DC_1, FieldId::F_DC_2];
    pub const RGB: [FieldId; 3] = [FieldId::RED, FieldId::GREEN, FieldId::BLUE];

    /// Id of the `f_rest_{index}` property, if `index` is recognized.
    pub fn rest(index: usize) -> Option<FieldId> {
        (index < MAX_REST_FIELDS).then(|| FieldId(Self::F_REST_0.0 + index as u8))
    }

    /// Looks up a property name.
    pub fn from_name(name: &str) -> Option<FieldId> {
        if let Some(pos) = CORE_NAMES.iter().position(|n| *n == name) {
            return Some(FieldId(pos as u8));
        }
        rest_index(name).and_then(FieldId::rest)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> String {
        match CORE_NAMES.get(self.index()) {
            Some(name) => (*name).to_string(),
            None => format!("f_rest_{}", self.index() - Self::F_REST_0.index()),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Parses the coefficient index out of an `f_rest_N` name.
pub fn rest_index(name: &str) -> Option<usize> {
    name.strip_prefix("f_rest_")?.parse().ok()
}

/// Presence bitmask over recognized fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSet(u64);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: FieldId) {
        self.0 |= 1u64 << id.0;
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.0 & (1u64 << id.0) != 0
    }

    pub fn contains_all(&self, ids: &[FieldId]) -> bool {
        ids.iter().all(|id| self.contains(*id))
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
