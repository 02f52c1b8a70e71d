//! PLY scalar property types and payload encodings.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Scalar type of a PLY property, as named in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl ScalarType {
    /// Parses both the classic (`uchar`, `float`) and sized (`uint8`,
    /// `float32`) spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "char" | "int8" => Some(ScalarType::Int8),
            "uchar" | "uint8" => Some(ScalarType::Uint8),
            "short" | "int16" => Some(ScalarType::Int16),
            "ushort" | "uint16" => Some(ScalarType::Uint16),
            "int" | "int32" => Some(ScalarType::Int32),
            "uint" | "uint32" => Some(ScalarType::Uint32),
            "float" | "float32" => Some(ScalarType::Float32),
            "double" | "float64" => Some(ScalarType::Float64),
            _ => None,
        }
    }

    pub fn byte_length(&self) -> usize {
        match self {
            ScalarType::Int8 | ScalarType::Uint8 => 1,
            ScalarType::Int16 | ScalarType::Uint16 => 2,
            ScalarType::Int32 | ScalarType::Uint32 | ScalarType::Float32 => 4,
            ScalarType::Float64 => 8,
        }
    }

    pub fn is_integral(&self) -> bool {
        !matches!(self, ScalarType::Float32 | ScalarType::Float64)
    }

    /// Decodes one value from the start of `bytes`.
    ///
    /// `bytes` must hold at least [`ScalarType::byte_length`] bytes. 8-bit
    /// unsigned values are normalized to `[0, 1]`, every other type is
    /// converted as-is.
    pub fn decode(&self, bytes: &[u8], encoding: Encoding) -> f32 {
        match encoding {
            Encoding::BinaryLittleEndian => self.decode_with::<LittleEndian>(bytes),
            Encoding::BinaryBigEndian => self.decode_with::<BigEndian>(bytes),
        }
    }

    fn decode_with<B: ByteOrder>(&self, bytes: &[u8]) -> f32 {
        match self {
            ScalarType::Int8 => bytes[0] as i8 as f32,
            ScalarType::Uint8 => bytes[0] as f32 / 255.0,
            ScalarType::Int16 => B::read_i16(bytes) as f32,
            ScalarType::Uint16 => B::read_u16(bytes) as f32,
            ScalarType::Int32 => B::read_i32(bytes) as f32,
            ScalarType::Uint32 => B::read_u32(bytes) as f32,
            ScalarType::Float32 => B::read_f32(bytes),
            ScalarType::Float64 => B::read_f64(bytes) as f32,
        }
    }
}

/// Binary payload encoding declared by the `format` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl Encoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "binary_little_endian" => Some(Encoding::BinaryLittleEndian),
            "binary_big_endian" => Some(Encoding::BinaryBigEndian),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::BinaryLittleEndian => "binary_little_endian",
            Encoding::BinaryBigEndian => "binary_big_endian",
        }
    }
}
