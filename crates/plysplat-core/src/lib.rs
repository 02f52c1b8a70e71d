//! plysplat core library
//!
//! Byte-level building blocks for decoding Gaussian splat PLY files: the
//! error type, PLY scalar types, bounds-checked payload access, the
//! activation math, the packed buffer layout and the canonical splat
//! container.

pub mod math_utils;
pub mod payload;
pub mod ply_types;
pub mod splat_array;
pub mod splat_layout;
pub mod status;

pub use payload::PayloadView;
pub use ply_types::{Encoding, ScalarType};
pub use splat_array::{SplatArray, UncompressedSplat, DEFAULT_OPACITY, DEFAULT_SCALE};
pub use splat_layout::SplatLayout;
pub use status::{PlyError, Result};
