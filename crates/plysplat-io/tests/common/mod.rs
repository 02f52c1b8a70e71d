//! Builds small binary splat PLY files for the integration tests.

#![allow(dead_code)]

pub const INRIA_FIELDS: [&str; 14] = [
    "x", "y", "z", "scale_0", "scale_1", "scale_2", "rot_0", "rot_1", "rot_2", "rot_3", "f_dc_0",
    "f_dc_1", "f_dc_2", "opacity",
];

#[derive(Debug, Clone)]
pub struct PlyBuilder {
    big_endian: bool,
    properties: Vec<(String, String)>,
    rows: Vec<Vec<f64>>,
}

impl PlyBuilder {
    pub fn new() -> Self {
        Self {
            big_endian: false,
            properties: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// A builder declaring `names` as float properties.
    pub fn floats(names: &[&str]) -> Self {
        let mut builder = Self::new();
        for name in names {
            builder = builder.property("float", name);
        }
        builder
    }

    /// The INRIA v1 fields followed by `rest` `f_rest_*` fields.
    pub fn inria(rest: usize) -> Self {
        let mut builder = Self::floats(&INRIA_FIELDS);
        for i in 0..rest {
            builder = builder.property("float", &format!("f_rest_{i}"));
        }
        builder
    }

    pub fn property(mut self, ty: &str, name: &str) -> Self {
        self.properties.push((ty.to_string(), name.to_string()));
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn row(mut self, values: &[f64]) -> Self {
        assert_eq!(values.len(), self.properties.len(), "row width mismatch");
        self.rows.push(values.to_vec());
        self
    }

    pub fn header_text(&self) -> String {
        let format = if self.big_endian {
            "binary_big_endian"
        } else {
            "binary_little_endian"
        };
        let mut text = format!(
            "ply\nformat {format} 1.0\ncomment built for tests\nelement vertex {}\n",
            self.rows.len()
        );
        for (ty, name) in &self.properties {
            text.push_str(&format!("property {ty} {name}\n"));
        }
        text.push_str("end_header\n");
        text
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = self.header_text().into_bytes();
        for row in &self.rows {
            for ((ty, _), value) in self.properties.iter().zip(row) {
                self.push_scalar(&mut data, ty, *value);
            }
        }
        data
    }

    fn push_scalar(&self, data: &mut Vec<u8>, ty: &str, value: f64) {
        macro_rules! push {
            ($v:expr) => {
                if self.big_endian {
                    data.extend_from_slice(&$v.to_be_bytes())
                } else {
                    data.extend_from_slice(&$v.to_le_bytes())
                }
            };
        }
        match ty {
            "char" | "int8" => push!(value as i8),
            "uchar" | "uint8" => push!(value as u8),
            "short" | "int16" => push!(value as i16),
            "ushort" | "uint16" => push!(value as u16),
            "int" | "int32" => push!(value as i32),
            "uint" | "uint32" => push!(value as u32),
            "float" | "float32" => push!(value as f32),
            "double" | "float64" => push!(value),
            other => panic!("unsupported test type {other}"),
        }
    }
}

/// One INRIA row with the given position and all other raw values zero,
/// except `rot_3`, which is one.
pub fn identity_row(x: f64, y: f64, z: f64) -> [f64; 14] {
    [x, y, z, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]
}
