//! Direct serialization of decoded rows into packed splat buffers.
//!
//! Rows are written at `out_offset + row * stride`, where the stride and the
//! per-attribute sub-offsets come from [`SplatLayout::uncompressed`]. Large
//! files can be decoded in disjoint row chunks straight into one preallocated
//! buffer without materializing canonical splats.

use plysplat_core::payload::PayloadView;
use plysplat_core::splat_array::UncompressedSplat;
use plysplat_core::splat_layout::SplatLayout;
use plysplat_core::status::{PlyError, Result};

use crate::header::PlyHeader;
use crate::row_reader::{read_row_into, RawRecord};
use crate::transform::{transform_record_into, DecodeStats};

/// Writes rows of one payload into packed buffers.
#[derive(Debug, Clone, Copy)]
pub struct BufferSerializer<'a> {
    header: &'a PlyHeader,
    payload: PayloadView<'a>,
    payload_offset: usize,
}

impl<'a> BufferSerializer<'a> {
    /// `payload_offset` is the byte offset of row 0 within `payload`.
    pub fn new(header: &'a PlyHeader, payload: PayloadView<'a>, payload_offset: usize) -> Self {
        Self {
            header,
            payload,
            payload_offset,
        }
    }

    /// Layout used for a requested degree, after clamping to the header.
    pub fn layout(&self, sh_degree: u8) -> SplatLayout {
        SplatLayout::uncompressed(self.header.clamp_sh_degree(sh_degree))
    }

    /// Serializes rows `from..=to` into `out`.
    ///
    /// # Errors
    ///
    /// - `PlyError::IndexOutOfRange` if `from > to` or `to` is not a row
    /// - `PlyError::BufferTooSmall` if `out` cannot hold row `to`; nothing is
    ///   written in that case
    /// - `PlyError::PartialDecode` if a row after `from` fails; rows before it
    ///   are fully written
    pub fn write_rows(
        &self,
        from: usize,
        to: usize,
        out: &mut [u8],
        out_offset: usize,
        sh_degree: u8,
    ) -> Result<DecodeStats> {
        let layout = self.layout(sh_degree);
        let stride = layout.bytes_per_splat();
        let section = self.section(from, to, out, out_offset, stride)?;
        let total = to - from + 1;

        let mut raw = RawRecord::new();
        let mut splat = UncompressedSplat::new(layout.sh_degree);
        let mut stats = DecodeStats::default();
        for (i, chunk) in section.chunks_exact_mut(stride).enumerate() {
            self.write_row(from + i, &layout, chunk, &mut raw, &mut splat, &mut stats)
                .map_err(|e| PlyError::partial(i, total, e))?;
        }
        Ok(stats)
    }

    /// Parallel form of [`BufferSerializer::write_rows`].
    ///
    /// Each worker owns disjoint destination chunks and its own scratch. The
    /// output is byte-identical to the sequential path. On failure, rows
    /// after the first failing one may also have been written.
    #[cfg(feature = "parallel")]
    pub fn write_rows_parallel(
        &self,
        from: usize,
        to: usize,
        out: &mut [u8],
        out_offset: usize,
        sh_degree: u8,
    ) -> Result<DecodeStats> {
        use rayon::prelude::*;

        let layout = self.layout(sh_degree);
        let stride = layout.bytes_per_splat();
        let section = self.section(from, to, out, out_offset, stride)?;
        let total = to - from + 1;

        let results: Vec<Result<DecodeStats>> = section
            .par_chunks_mut(stride)
            .enumerate()
            .map_init(
                || (RawRecord::new(), UncompressedSplat::new(layout.sh_degree)),
                |(raw, splat), (i, chunk)| {
                    let mut stats = DecodeStats::default();
                    self.write_row(from + i, &layout, chunk, raw, splat, &mut stats)
                        .map(|_| stats)
                },
            )
            .collect();

        let mut stats = DecodeStats::default();
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(row_stats) => stats.merge(row_stats),
                Err(e) => return Err(PlyError::partial(i, total, e)),
            }
        }
        Ok(stats)
    }

    fn section<'b>(
        &self,
        from: usize,
        to: usize,
        out: &'b mut [u8],
        out_offset: usize,
        stride: usize,
    ) -> Result<&'b mut [u8]> {
        let count = self.header.record_count;
        if to >= count {
            return Err(PlyError::IndexOutOfRange { index: to, count });
        }
        if from > to {
            return Err(PlyError::IndexOutOfRange { index: from, count });
        }
        let byte_offset = |row: usize| {
            row.checked_mul(stride)
                .and_then(|offset| offset.checked_add(out_offset))
        };
        let (start, end) = match (byte_offset(from), byte_offset(to + 1)) {
            (Some(start), Some(end)) if end <= out.len() => (start, end),
            (_, end) => {
                return Err(PlyError::BufferTooSmall {
                    needed: end.unwrap_or(usize::MAX),
                    available: out.len(),
                })
            }
        };
        Ok(&mut out[start..end])
    }

    fn write_row(
        &self,
        row: usize,
        layout: &SplatLayout,
        chunk: &mut [u8],
        raw: &mut RawRecord,
        splat: &mut UncompressedSplat,
        stats: &mut DecodeStats,
    ) -> Result<()> {
        read_row_into(&self.payload, self.header, row, self.payload_offset, raw)?;
        transform_record_into(raw, self.header, layout.sh_degree, splat, stats)?;
        splat.write_packed(layout, chunk);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::decode_header;
    use byteorder::{ByteOrder, LittleEndian};
    use plysplat_core::ply_types::Encoding;

    fn file(rows: usize) -> Vec<u8> {
        let mut data = format!(
            "ply\nformat binary_little_endian 1.0\nelement vertex {rows}\n\
             property float x\nproperty float y\nproperty float z\n\
             property float opacity\nend_header\n"
        )
        .into_bytes();
        for r in 0..rows {
            for v in [r as f32, r as f32 + 0.5, -(r as f32), 0.0] {
                data.extend_from_slice(&v.to_le_bytes());
            }
        }
        data
    }

    #[test]
    fn test_rows_land_at_absolute_offsets() {
        let data = file(4);
        let header = decode_header(&data).unwrap();
        let payload = PayloadView::new(&data, Encoding::BinaryLittleEndian);
        let serializer = BufferSerializer::new(&header, payload, header.header_byte_length);

        let mut out = vec![0u8; 8 + 4 * 44];
        let stats = serializer.write_rows(2, 3, &mut out, 8, 2).unwrap();
        assert_eq!(stats.rows, 2);

        assert!(out[..8 + 2 * 44].iter().all(|b| *b == 0));
        let row2 = 8 + 2 * 44;
        assert_eq!(LittleEndian::read_f32(&out[row2..]), 2.0);
        assert_eq!(LittleEndian::read_f32(&out[row2 + 4..]), 2.5);
        assert_eq!(LittleEndian::read_f32(&out[row2 + 12..]), 0.01);
        assert_eq!(LittleEndian::read_f32(&out[row2 + 36..]), 1.0);
        assert_eq!(&out[row2 + 40..row2 + 44], &[0, 0, 0, 127]);
        let row3 = 8 + 3 * 44;
        assert_eq!(LittleEndian::read_f32(&out[row3 + 8..]), -3.0);
    }

    #[test]
    fn test_short_destination_writes_nothing() {
        let data = file(2);
        let header = decode_header(&data).unwrap();
        let payload = PayloadView::new(&data, Encoding::BinaryLittleEndian);
        let serializer = BufferSerializer::new(&header, payload, header.header_byte_length);

        let mut out = vec![0u8; 44];
        assert!(matches!(
            serializer.write_rows(0, 1, &mut out, 0, 0),
            Err(PlyError::BufferTooSmall { needed: 88, available: 44 })
        ));
        assert!(out.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_bad_ranges() {
        let data = file(2);
        let header = decode_header(&data).unwrap();
        let payload = PayloadView::new(&data, Encoding::BinaryLittleEndian);
        let serializer = BufferSerializer::new(&header, payload, header.header_byte_length);
        let mut out = vec![0u8; 1024];
        assert!(matches!(
            serializer.write_rows(0, 2, &mut out, 0, 0),
            Err(PlyError::IndexOutOfRange { index: 2, count: 2 })
        ));
        assert!(matches!(
            serializer.write_rows(1, 0, &mut out, 0, 0),
            Err(PlyError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_truncated_payload_is_partial() {
        let mut data = file(3);
        data.truncate(data.len() - 1);
        let header = decode_header(&data).unwrap();
        let payload = PayloadView::new(&data, Encoding::BinaryLittleEndian);
        let serializer = BufferSerializer::new(&header, payload, header.header_byte_length);
        let mut out = vec![0u8; 3 * 44];
        let err = serializer.write_rows(0, 2, &mut out, 0, 0).unwrap_err();
        assert_eq!(err.completed_rows(), Some(2));
        assert_eq!(LittleEndian::read_f32(&out[44..]), 1.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let data = file(64);
        let header = decode_header(&data).unwrap();
        let payload = PayloadView::new(&data, Encoding::BinaryLittleEndian);
        let serializer = BufferSerializer::new(&header, payload, header.header_byte_length);

        let mut seq = vec![0u8; 64 * 44];
        let mut par = vec![0u8; 64 * 44];
        let a = serializer.write_rows(0, 63, &mut seq, 0, 0).unwrap();
        let b = serializer.write_rows_parallel(0, 63, &mut par, 0, 0).unwrap();
        assert_eq!(seq, par);
        assert_eq!(a, b);
    }
}
