use crate::ply_types::{Encoding, ScalarType};
use crate::status::PlyError;

/// Read-only view over the binary records that follow a PLY header.
///
/// `PayloadView` provides bounds-checked random access to scalar values at
/// absolute byte offsets. It never copies the underlying bytes.
///
/// # Example
///
/// ```
/// use plysplat_core::payload::PayloadView;
/// use plysplat_core::ply_types::{Encoding, ScalarType};
///
/// let data = 2.0f32.to_le_bytes();
/// let view = PayloadView::new(&data, Encoding::BinaryLittleEndian);
/// assert_eq!(view.read_scalar(0, ScalarType::Float32).unwrap(), 2.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PayloadView<'a> {
    data: &'a [u8],
    encoding: Encoding,
}

impl<'a> PayloadView<'a> {
    pub fn new(data: &'a [u8], encoding: Encoding) -> Self {
        Self { data, encoding }
    }

    /// Creates a view starting `offset` bytes into `data`.
    ///
    /// # Errors
    ///
    /// Returns `PlyError::BufferTooSmall` if `offset` is past the end.
    pub fn with_offset(data: &'a [u8], offset: usize, encoding: Encoding) -> Result<Self, PlyError> {
        if offset > data.len() {
            return Err(PlyError::BufferTooSmall {
                needed: offset,
                available: data.len(),
            });
        }
        Ok(Self::new(&data[offset..], encoding))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `PlyError::BufferTooSmall` if the range runs past the end.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], PlyError> {
        let end = offset.checked_add(len).ok_or(PlyError::BufferTooSmall {
            needed: usize::MAX,
            available: self.data.len(),
        })?;
        if end > self.data.len() {
            return Err(PlyError::BufferTooSmall {
                needed: end,
                available: self.data.len(),
            });
        }
        Ok(&self.data[offset..end])
    }

    /// Decodes one scalar of type `ty` at `offset`.
    pub fn read_scalar(&self, offset: usize, ty: ScalarType) -> Result<f32, PlyError> {
        let bytes = self.slice(offset, ty.byte_length())?;
        Ok(ty.decode(bytes, self.encoding))
    }
}
