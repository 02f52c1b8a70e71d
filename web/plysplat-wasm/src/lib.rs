//! Splat PLY decoding WASM module.
//!
//! Decodes binary INRIA v1 splat PLY files into packed splat buffers that can
//! be uploaded to the GPU directly from JavaScript.

use plysplat_io::{decode_header, DecodeOptions, PlySplatReader, SplatReader};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Header information for JavaScript interop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub format: String,
    pub splat_count: usize,
    pub bytes_per_record: usize,
    pub header_byte_length: usize,
    pub sh_degree: u8,
    /// Bytes per packed splat for each harmonics degree `0..=sh_degree`.
    pub packed_strides: Vec<usize>,
    pub properties: Vec<String>,
}

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the version of this WASM module.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get supported file extensions.
#[wasm_bindgen]
pub fn supported_extensions() -> Vec<String> {
    vec!["ply".to_string()]
}

/// Decode a splat PLY file into a packed buffer.
///
/// The requested harmonics degree is clamped to what the file provides.
#[wasm_bindgen]
pub fn parse_ply_splats(data: &[u8], sh_degree: u8) -> Result<js_sys::Uint8Array, JsValue> {
    let packed = decode_packed(data, sh_degree).map_err(|e| JsValue::from_str(&e))?;
    Ok(js_sys::Uint8Array::from(packed.as_slice()))
}

/// Decode only the header of a splat PLY file.
#[wasm_bindgen]
pub fn inspect_ply_header(data: &[u8]) -> Result<JsValue, JsValue> {
    let info = header_info(data).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&info).map_err(JsValue::from)
}

fn decode_packed(data: &[u8], sh_degree: u8) -> Result<Vec<u8>, String> {
    let reader = PlySplatReader::from_bytes(data.to_vec()).map_err(|e| e.to_string())?;
    let options = DecodeOptions::new().with_sh_degree(sh_degree);
    reader.read_packed(&options).map_err(|e| e.to_string())
}

fn header_info(data: &[u8]) -> Result<HeaderInfo, String> {
    let header = decode_header(data).map_err(|e| e.to_string())?;
    let packed_strides = (0..=header.sh_degree)
        .map(|degree| plysplat_core::SplatLayout::uncompressed(degree).bytes_per_splat())
        .collect();
    Ok(HeaderInfo {
        format: header.encoding.name().to_string(),
        splat_count: header.record_count,
        bytes_per_record: header.bytes_per_record,
        header_byte_length: header.header_byte_length,
        sh_degree: header.sh_degree,
        packed_strides,
        properties: header.properties.iter().map(|p| p.name.clone()).collect(),
    })
}
