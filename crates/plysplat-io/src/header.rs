//! PLY header decoding.
//!
//! The header is an ASCII preamble of newline-terminated declaration lines
//! closed by `end_header`. Only the `vertex` element is decoded. Every vertex
//! property counts towards the record stride, but only recognized names get
//! a slot in the field table.

use plysplat_core::math_utils::MAX_SH_DEGREE;
use plysplat_core::ply_types::{Encoding, ScalarType};
use plysplat_core::status::{PlyError, Result};

use crate::field::{rest_index, FieldId, FieldSet, FIELD_COUNT};

/// Token closing the header.
pub const HEADER_END_TOKEN: &str = "end_header";

const MAGIC: &str = "ply";

/// Byte offset and type of a recognized field inside one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub offset: usize,
    pub ty: ScalarType,
}

/// One declared vertex property, recognized or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: ScalarType,
    pub offset: usize,
}

/// Decoded schema of a splat PLY file. Owns no payload bytes.
#[derive(Debug, Clone)]
pub struct PlyHeader {
    pub record_count: usize,
    pub bytes_per_record: usize,
    pub header_byte_length: usize,
    pub encoding: Encoding,
    pub sh_degree: u8,
    /// Degree-1 rest coefficient ids in canonical output order (9 ids when
    /// `sh_degree >= 1`, otherwise empty).
    pub sh_degree1_field_ids: Vec<FieldId>,
    /// Degree-2 rest coefficient ids in canonical output order (15 ids when
    /// `sh_degree >= 2`, otherwise empty).
    pub sh_degree2_field_ids: Vec<FieldId>,
    pub properties: Vec<PropertyDecl>,
    fields: [Option<FieldSlot>; FIELD_COUNT],
    present: FieldSet,
    decoded: Vec<(FieldId, FieldSlot)>,
}

impl PlyHeader {
    /// Slot of a recognized field, if the schema declares it.
    pub fn field(&self, id: FieldId) -> Option<FieldSlot> {
        self.fields[id.index()]
    }

    pub fn present(&self) -> FieldSet {
        self.present
    }

    pub fn has_field(&self, id: FieldId) -> bool {
        self.present.contains(id)
    }

    /// Recognized fields in declaration order, as decoded per row.
    pub fn decoded_fields(&self) -> &[(FieldId, FieldSlot)] {
        &self.decoded
    }

    /// Byte length of the binary payload implied by the header.
    ///
    /// Decoding rejects headers where this overflows; for a header edited
    /// afterwards the value saturates.
    pub fn payload_byte_length(&self) -> usize {
        self.record_count.saturating_mul(self.bytes_per_record)
    }

    /// Total file length implied by the header. Saturates like
    /// [`PlyHeader::payload_byte_length`].
    pub fn expected_total_length(&self) -> usize {
        self.header_byte_length
            .saturating_add(self.payload_byte_length())
    }

    /// Rows whose records lie completely inside a buffer of `total_len`
    /// bytes holding the header and payload.
    pub fn complete_rows(&self, total_len: usize) -> usize {
        let available = total_len.saturating_sub(self.header_byte_length);
        match available.checked_div(self.bytes_per_record) {
            Some(rows) => rows.min(self.record_count),
            None => self.record_count,
        }
    }

    /// Clamps a requested harmonics degree to what this file can supply.
    pub fn clamp_sh_degree(&self, requested: u8) -> u8 {
        requested.min(self.sh_degree)
    }
}

/// Locates the header in `buffer` and returns its text and byte length.
///
/// The byte length covers the `end_header` line including its newline.
///
/// # Errors
///
/// Returns `PlyError::HeaderParse` if no `end_header` line exists or the
/// header is not valid ASCII.
pub fn read_header_text(buffer: &[u8]) -> Result<(&str, usize)> {
    let mut line_start = 0;
    while line_start < buffer.len() {
        let line_end = buffer[line_start..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|p| line_start + p);
        let content_end = line_end.unwrap_or(buffer.len());
        let line = trim_cr(&buffer[line_start..content_end]);
        if line == HEADER_END_TOKEN.as_bytes() {
            let header_len = match line_end {
                Some(newline) => newline + 1,
                None => {
                    return Err(PlyError::header(
                        "end_header is not terminated by a newline",
                    ))
                }
            };
            let text = std::str::from_utf8(&buffer[..header_len])
                .map_err(|e| PlyError::header(format!("header is not valid ASCII: {e}")))?;
            return Ok((text, header_len));
        }
        match line_end {
            Some(newline) => line_start = newline + 1,
            None => break,
        }
    }
    Err(PlyError::header("no end_header token found"))
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Decodes the header at the start of `buffer`.
pub fn decode_header(buffer: &[u8]) -> Result<PlyHeader> {
    let (text, header_byte_length) = read_header_text(buffer)?;
    decode_header_text(text, header_byte_length)
}

/// Decodes header text whose byte length (through the `end_header` newline)
/// is `header_byte_length`.
pub fn decode_header_text(text: &str, header_byte_length: usize) -> Result<PlyHeader> {
    let lines: Vec<&str> = text.lines().collect();
    let mut header = decode_header_lines(&lines)?;
    if header_byte_length
        .checked_add(header.payload_byte_length())
        .is_none()
    {
        return Err(PlyError::header(format!(
            "element vertex {} does not fit in addressable memory",
            header.record_count
        )));
    }
    header.header_byte_length = header_byte_length;
    Ok(header)
}

#[derive(Debug, PartialEq, Eq)]
enum Section {
    Preamble,
    Vertex,
    Other,
}

/// Decodes header lines. The returned header has `header_byte_length` unset
/// (zero) since lines alone do not carry byte positions.
pub fn decode_header_lines(lines: &[&str]) -> Result<PlyHeader> {
    let mut lines = lines.iter().map(|l| l.trim());
    match lines.next() {
        Some(MAGIC) => {}
        other => {
            return Err(PlyError::header(format!(
                "expected 'ply' magic, found {:?}",
                other.unwrap_or("")
            )))
        }
    }

    let mut encoding = None;
    let mut section = Section::Preamble;
    let mut seen_vertex = false;
    let mut vertex_count = 0usize;
    let mut bytes_per_vertex = 0usize;
    let mut properties = Vec::new();
    let mut fields = [None; FIELD_COUNT];
    let mut present = FieldSet::new();
    let mut decoded = Vec::new();
    let mut terminated = false;

    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(keyword) = tokens.first() else {
            continue;
        };
        match *keyword {
            "format" => {
                let name = tokens
                    .get(1)
                    .ok_or_else(|| PlyError::header("format line without encoding"))?;
                encoding = Some(Encoding::from_name(name).ok_or_else(|| {
                    PlyError::UnsupportedFormat(format!("{name} payloads are not supported"))
                })?);
            }
            "comment" | "obj_info" => {}
            "element" => {
                let (name, count) = match tokens.as_slice() {
                    [_, name, count] => (*name, *count),
                    _ => return Err(PlyError::header(format!("malformed element line: {line}"))),
                };
                let count: usize = count
                    .parse()
                    .map_err(|_| PlyError::header(format!("invalid element count: {line}")))?;
                if name == "vertex" {
                    if section != Section::Preamble {
                        return Err(PlyError::UnsupportedFormat(
                            "vertex element must be the first element".into(),
                        ));
                    }
                    seen_vertex = true;
                    vertex_count = count;
                    section = Section::Vertex;
                } else {
                    section = Section::Other;
                }
            }
            "property" => {
                if section == Section::Preamble {
                    return Err(PlyError::header(format!("property before any element: {line}")));
                }
                if tokens.get(1) == Some(&"list") {
                    if section == Section::Vertex {
                        return Err(PlyError::UnsupportedFormat(format!(
                            "list property in vertex element: {line}"
                        )));
                    }
                    continue;
                }
                let (ty_name, name) = match tokens.as_slice() {
                    [_, ty, name] => (*ty, *name),
                    _ => return Err(PlyError::header(format!("malformed property line: {line}"))),
                };
                let ty = ScalarType::from_name(ty_name)
                    .ok_or_else(|| PlyError::header(format!("unknown property type: {ty_name}")))?;
                if section != Section::Vertex {
                    continue;
                }
                if properties.iter().any(|p: &PropertyDecl| p.name == name) {
                    return Err(PlyError::header(format!("duplicate property: {name}")));
                }
                if let Some(id) = FieldId::from_name(name) {
                    let slot = FieldSlot {
                        offset: bytes_per_vertex,
                        ty,
                    };
                    fields[id.index()] = Some(slot);
                    present.insert(id);
                    decoded.push((id, slot));
                }
                properties.push(PropertyDecl {
                    name: name.to_string(),
                    ty,
                    offset: bytes_per_vertex,
                });
                bytes_per_vertex += ty.byte_length();
            }
            HEADER_END_TOKEN => {
                terminated = true;
                break;
            }
            other => {
                log::debug!("Ignoring unknown header keyword '{other}'");
            }
        }
    }

    if !terminated {
        return Err(PlyError::header("no end_header token found"));
    }
    let encoding =
        encoding.ok_or_else(|| PlyError::UnsupportedFormat("missing format line".into()))?;
    if !seen_vertex {
        return Err(PlyError::header("no vertex element declared"));
    }
    if vertex_count.checked_mul(bytes_per_vertex).is_none() {
        return Err(PlyError::header(format!(
            "element vertex {vertex_count} with {bytes_per_vertex}-byte records overflows the payload size"
        )));
    }

    let rest_count = properties
        .iter()
        .filter(|p| rest_index(&p.name).is_some())
        .count();
    let (sh_degree, sh_degree1_field_ids, sh_degree2_field_ids) =
        detect_sh_layout(rest_count, &present);

    Ok(PlyHeader {
        record_count: vertex_count,
        bytes_per_record: bytes_per_vertex,
        header_byte_length: 0,
        encoding,
        sh_degree,
        sh_degree1_field_ids,
        sh_degree2_field_ids,
        properties,
        fields,
        present,
        decoded,
    })
}

/// Works out the harmonics degree and the canonical coefficient order from
/// the declared rest fields.
///
/// Rest coefficients are stored channel-major: all of red's coefficients,
/// then green's, then blue's, `n = rest_count / 3` per channel. The canonical
/// order keeps channels grouped but drops the higher-degree coefficients
/// between them, so the ids are picked with a stride of `n`.
fn detect_sh_layout(rest_count: usize, present: &FieldSet) -> (u8, Vec<FieldId>, Vec<FieldId>) {
    let per_channel = rest_count / 3;
    let pick = |first: usize, len: usize| -> Option<Vec<FieldId>> {
        let mut ids = Vec::with_capacity(len * 3);
        for channel in 0..3 {
            for i in 0..len {
                let id = FieldId::rest(channel * per_channel + first + i)?;
                if !present.contains(id) {
                    return None;
                }
                ids.push(id);
            }
        }
        Some(ids)
    };

    let degree1 = if per_channel >= 3 { pick(0, 3) } else { None };
    let Some(degree1) = degree1 else {
        return (0, Vec::new(), Vec::new());
    };
    let degree2 = if per_channel >= 8 { pick(3, 5) } else { None };
    match degree2 {
        Some(degree2) => (MAX_SH_DEGREE, degree1, degree2),
        None => (1, degree1, Vec::new()),
    }
}
