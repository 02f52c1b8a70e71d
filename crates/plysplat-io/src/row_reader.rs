use plysplat_core::payload::PayloadView;
use plysplat_core::status::{PlyError, Result};

use crate::field::{FieldId, FIELD_COUNT};
use crate::header::PlyHeader;

/// Raw values of one record, indexed by [`FieldId`].
///
/// A field the schema does not declare stays `None`, which is distinct from
/// a declared field holding zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    values: [Option<f32>; FIELD_COUNT],
}

impl Default for RawRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl RawRecord {
    pub fn new() -> Self {
        Self {
            values: [None; FIELD_COUNT],
        }
    }

    pub fn get(&self, id: FieldId) -> Option<f32> {
        self.values[id.index()]
    }

    pub fn set(&mut self, id: FieldId, value: f32) {
        self.values[id.index()] = Some(value);
    }

    pub fn clear(&mut self) {
        self.values = [None; FIELD_COUNT];
    }

    /// Returns all of `ids` if every one is present.
    pub fn get_all<const N: usize>(&self, ids: [FieldId; N]) -> Option<[f32; N]> {
        let mut out = [0.0; N];
        for (slot, id) in out.iter_mut().zip(ids) {
            *slot = self.get(id)?;
        }
        Some(out)
    }
}

/// Reads row `row` of the payload into a fresh record.
///
/// The record starts at `base_offset + row * bytes_per_record` within
/// `payload`.
///
/// # Errors
///
/// - `PlyError::IndexOutOfRange` if `row >= header.record_count`
/// - `PlyError::BufferTooSmall` if the payload is truncated
pub fn read_row(
    payload: &PayloadView<'_>,
    header: &PlyHeader,
    row: usize,
    base_offset: usize,
) -> Result<RawRecord> {
    let mut record = RawRecord::new();
    read_row_into(payload, header, row, base_offset, &mut record)?;
    Ok(record)
}

/// Like [`read_row`], but reuses `record` as scratch.
///
/// Slots for fields the header does not declare are left untouched, so a
/// record reused across rows of one header never carries stale values.
pub fn read_row_into(
    payload: &PayloadView<'_>,
    header: &PlyHeader,
    row: usize,
    base_offset: usize,
    record: &mut RawRecord,
) -> Result<()> {
    if row >= header.record_count {
        return Err(PlyError::IndexOutOfRange {
            index: row,
            count: header.record_count,
        });
    }
    let record_start = row
        .checked_mul(header.bytes_per_record)
        .and_then(|offset| offset.checked_add(base_offset))
        .ok_or(PlyError::BufferTooSmall {
            needed: usize::MAX,
            available: payload.len(),
        })?;
    // Bounds check the whole record once so truncation is reported even for
    // rows whose recognized fields happen to fit.
    payload.slice(record_start, header.bytes_per_record)?;
    for (id, slot) in header.decoded_fields() {
        let value = payload.read_scalar(record_start + slot.offset, slot.ty)?;
        record.set(*id, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::decode_header;
    use plysplat_core::ply_types::Encoding;

    fn sample() -> (PlyHeader, Vec<u8>) {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 2\n\
                    property float x\nproperty float y\nproperty float z\n\
                    property uchar red\nproperty float extra\nend_header\n";
        let header = decode_header(text.as_bytes()).unwrap();
        let mut payload = Vec::new();
        for row in 0..2 {
            let base = row as f32 * 10.0;
            for v in [base + 1.0, base + 2.0, base + 3.0] {
                payload.extend_from_slice(&v.to_le_bytes());
            }
            payload.push(255);
            payload.extend_from_slice(&99.0f32.to_le_bytes());
        }
        (header, payload)
    }

    #[test]
    fn test_reads_each_row() {
        let (header, payload) = sample();
        let view = PayloadView::new(&payload, Encoding::BinaryLittleEndian);
        let r0 = read_row(&view, &header, 0, 0).unwrap();
        assert_eq!(r0.get_all(FieldId::POSITION), Some([1.0, 2.0, 3.0]));
        assert_eq!(r0.get(FieldId::RED), Some(1.0));
        assert_eq!(r0.get(FieldId::GREEN), None);

        let r1 = read_row(&view, &header, 1, 0).unwrap();
        assert_eq!(r1.get(FieldId::X), Some(11.0));
        assert_eq!(r1.get_all(FieldId::RGB), None);
    }

    #[test]
    fn test_base_offset() {
        let (header, payload) = sample();
        let mut shifted = vec![0xAA; 5];
        shifted.extend_from_slice(&payload);
        let view = PayloadView::new(&shifted, Encoding::BinaryLittleEndian);
        let r1 = read_row(&view, &header, 1, 5).unwrap();
        assert_eq!(r1.get(FieldId::Z), Some(13.0));
    }

    #[test]
    fn test_out_of_range_row() {
        let (header, payload) = sample();
        let view = PayloadView::new(&payload, Encoding::BinaryLittleEndian);
        assert!(matches!(
            read_row(&view, &header, 2, 0),
            Err(PlyError::IndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let (header, payload) = sample();
        let view = PayloadView::new(&payload[..payload.len() - 2], Encoding::BinaryLittleEndian);
        assert!(read_row(&view, &header, 0, 0).is_ok());
        assert!(matches!(
            read_row(&view, &header, 1, 0),
            Err(PlyError::BufferTooSmall { .. })
        ));
    }
}
