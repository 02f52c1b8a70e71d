//! Common trait for splat readers.
//!
//! Import the trait to access its methods:
//!
//! ```ignore
//! use plysplat_io::{DecodeOptions, PlySplatReader, SplatReader};
//!
//! let reader = PlySplatReader::open("scene.ply")?;
//! let splats = reader.read_splats(&DecodeOptions::new())?;
//! ```
//!
//! This enables generic functions:
//!
//! ```ignore
//! fn load<R: SplatReader>(path: &str) -> Result<Vec<u8>> {
//!     R::open(path)?.read_packed(&DecodeOptions::new().with_sh_degree(2))
//! }
//! ```

use std::path::Path;

use plysplat_core::splat_array::SplatArray;
use plysplat_core::status::Result;

use crate::options::DecodeOptions;

/// Trait for readers that produce Gaussian splats.
pub trait SplatReader: Sized {
    /// Open a file for reading.
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Number of splats declared by the file.
    fn splat_count(&self) -> usize;

    /// Highest harmonics degree the file provides.
    fn sh_degree(&self) -> u8;

    /// Decode every splat into canonical form.
    fn read_splats(&self, options: &DecodeOptions) -> Result<SplatArray>;

    /// Decode every splat straight into a packed buffer.
    fn read_packed(&self, options: &DecodeOptions) -> Result<Vec<u8>>;
}
