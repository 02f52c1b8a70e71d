//! plysplat I/O library for decoding Gaussian splat PLY files.
//!
//! Reads binary PLY files in the INRIA v1 layout produced by 3D Gaussian
//! Splatting training and turns every vertex record into a render-ready
//! splat: linear scales, a unit rotation quaternion, 8-bit RGBA color and
//! optional spherical-harmonics coefficients.
//!
//! # Pipeline
//!
//! | Stage        | Module          | Output                          |
//! |--------------|-----------------|---------------------------------|
//! | Header       | [`header`]      | [`PlyHeader`]                   |
//! | Rows         | [`row_reader`]  | [`RawRecord`]                   |
//! | Activations  | [`transform`]   | `UncompressedSplat`             |
//! | Packing      | [`serializer`]  | bytes in a caller's buffer      |
//!
//! [`PlySplatReader`] and the free functions in [`ply_splat_reader`] drive
//! the whole pipeline.
//!
//! ```ignore
//! use plysplat_io::{DecodeOptions, PlySplatReader, SplatReader};
//!
//! let reader = PlySplatReader::open("point_cloud.ply")?;
//! let options = DecodeOptions::new().with_sh_degree(2);
//!
//! // Canonical splats
//! let splats = reader.read_splats(&options)?;
//!
//! // Or a packed buffer of 140-byte records
//! let packed = reader.read_packed(&options)?;
//! ```
//!
//! # Features
//!
//! - `parallel`: splits packed serialization across rayon workers when
//!   [`DecodeOptions::parallel`] is set. The output is byte-identical.

pub mod field;
pub mod header;
pub mod options;
pub mod ply_splat_reader;
pub mod row_reader;
pub mod serializer;
pub mod traits;
pub mod transform;

pub use field::{FieldId, FieldSet};
pub use header::{decode_header, PlyHeader};
pub use options::DecodeOptions;
pub use ply_splat_reader::{
    decode_section_splat_data, find_splat_data, parse_to_splat_array, parse_to_splat_buffer,
    PlySplatReader,
};
pub use row_reader::{read_row, RawRecord};
pub use serializer::BufferSerializer;
pub use traits::SplatReader;
pub use transform::{transform_record, DecodeStats};
