//! INRIA v1 splat PLY reader.
//!
//! Provides both a struct-based API (`PlySplatReader`) and free functions
//! over borrowed buffers. Either path decodes the header once, locates the
//! payload right after it and then either collects canonical splats into a
//! [`SplatArray`] or serializes them straight into a packed buffer.

use std::fs;
use std::path::{Path, PathBuf};

use plysplat_core::payload::PayloadView;
use plysplat_core::splat_array::SplatArray;
use plysplat_core::splat_layout::SplatLayout;
use plysplat_core::status::{PlyError, Result};

use crate::header::{decode_header, PlyHeader};
use crate::options::DecodeOptions;
use crate::row_reader::{read_row_into, RawRecord};
use crate::serializer::BufferSerializer;
use crate::traits::SplatReader;
use crate::transform::{require_position, transform_record, DecodeStats};

/// Reader over an in-memory splat PLY file.
#[derive(Debug)]
pub struct PlySplatReader {
    path: Option<PathBuf>,
    data: Vec<u8>,
    header: PlyHeader,
}

impl PlySplatReader {
    /// Reads and decodes the header of the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read(&path)?;
        log::info!("Read {} bytes from {}", data.len(), path.display());
        let mut reader = Self::from_bytes(data)?;
        reader.path = Some(path);
        Ok(reader)
    }

    /// Takes ownership of a complete file and decodes its header.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let header = decode_header(&data)?;
        log_header(&header, data.len());
        Ok(Self {
            path: None,
            data,
            header,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Binary records following the header.
    pub fn payload(&self) -> Result<PayloadView<'_>> {
        find_splat_data(&self.data, &self.header)
    }

    /// Bytes needed for the packed buffer of every splat at `sh_degree`.
    pub fn packed_buffer_len(&self, sh_degree: u8) -> Result<usize> {
        packed_buffer_len(&self.header, sh_degree)
    }

    /// Decodes every splat into a new array.
    pub fn decode_splat_array(&self, options: &DecodeOptions) -> Result<(SplatArray, DecodeStats)> {
        let payload = self.payload()?;
        let decoded = decode_section_splat_data(&payload, &self.header, options.sh_degree())?;
        log_stats(&decoded.1);
        Ok(decoded)
    }

    /// Serializes every splat into `out`, starting at byte `out_offset`.
    pub fn decode_into_buffer(
        &self,
        out: &mut [u8],
        out_offset: usize,
        options: &DecodeOptions,
    ) -> Result<DecodeStats> {
        let stats = parse_to_splat_buffer(&self.data, &self.header, out, out_offset, options)?;
        log_stats(&stats);
        Ok(stats)
    }
}

impl SplatReader for PlySplatReader {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        PlySplatReader::open(path)
    }

    fn splat_count(&self) -> usize {
        self.header.record_count
    }

    fn sh_degree(&self) -> u8 {
        self.header.sh_degree
    }

    fn read_splats(&self, options: &DecodeOptions) -> Result<SplatArray> {
        Ok(self.decode_splat_array(options)?.0)
    }

    /// Allocates only for rows the file actually holds, so a header that
    /// overstates its record count fails without a huge allocation.
    fn read_packed(&self, options: &DecodeOptions) -> Result<Vec<u8>> {
        let header = &self.header;
        let total = header.record_count;
        if total > 0 {
            require_position(&header.present())?;
        }
        let complete = header.complete_rows(self.data.len());
        let mut out = vec![0u8; packed_rows_len(header, options.sh_degree(), complete)?];
        if complete == total {
            self.decode_into_buffer(&mut out, 0, options)?;
            return Ok(out);
        }

        if complete > 0 {
            let payload = PayloadView::new(&self.data, header.encoding);
            let serializer = BufferSerializer::new(header, payload, header.header_byte_length);
            log_stats(&write_all_rows(&serializer, complete - 1, &mut out, 0, options)?);
        }
        let needed = complete
            .saturating_add(1)
            .saturating_mul(header.bytes_per_record)
            .saturating_add(header.header_byte_length);
        Err(PlyError::partial(
            complete,
            total,
            PlyError::BufferTooSmall {
                needed,
                available: self.data.len(),
            },
        ))
    }
}

// ============================================================================
// Free functions over borrowed buffers
// ============================================================================

/// Returns the payload of `buffer`, which begins right after the header.
pub fn find_splat_data<'a>(buffer: &'a [u8], header: &PlyHeader) -> Result<PayloadView<'a>> {
    PayloadView::with_offset(buffer, header.header_byte_length, header.encoding)
}

/// Bytes needed for the packed buffer of every splat in `header`.
///
/// # Errors
///
/// Returns `PlyError::HeaderParse` if the size does not fit in `usize`.
pub fn packed_buffer_len(header: &PlyHeader, sh_degree: u8) -> Result<usize> {
    packed_rows_len(header, sh_degree, header.record_count)
}

fn packed_rows_len(header: &PlyHeader, sh_degree: u8, rows: usize) -> Result<usize> {
    let layout = SplatLayout::uncompressed(header.clamp_sh_degree(sh_degree));
    layout.buffer_len(rows).ok_or_else(|| {
        PlyError::header(format!(
            "{rows} splats of {} bytes overflow a packed buffer",
            layout.bytes_per_splat()
        ))
    })
}

/// Decodes every row of `payload` (row 0 at offset 0) into a new array.
///
/// # Errors
///
/// A failure on row 0 is returned as-is. A failure on a later row is
/// wrapped in `PlyError::PartialDecode`.
pub fn decode_section_splat_data(
    payload: &PayloadView<'_>,
    header: &PlyHeader,
    sh_degree: u8,
) -> Result<(SplatArray, DecodeStats)> {
    let total = header.record_count;
    // Capacity is bounded by the rows the payload can hold, not the count the
    // header claims.
    let capacity = payload
        .len()
        .checked_div(header.bytes_per_record)
        .map_or(0, |rows| rows.min(total));
    let mut array = SplatArray::with_capacity(header.clamp_sh_degree(sh_degree), capacity);
    let mut stats = DecodeStats::default();
    let mut raw = RawRecord::new();
    for row in 0..total {
        read_row_into(payload, header, row, 0, &mut raw)
            .and_then(|_| transform_record(&raw, header, sh_degree, &mut stats))
            .map(|splat| array.add_splat(splat))
            .map_err(|e| PlyError::partial(row, total, e))?;
    }
    Ok((array, stats))
}

/// Decodes a complete splat PLY file into a [`SplatArray`].
pub fn parse_to_splat_array(buffer: &[u8], options: &DecodeOptions) -> Result<SplatArray> {
    let header = decode_header(buffer)?;
    log_header(&header, buffer.len());
    let payload = find_splat_data(buffer, &header)?;
    let (array, stats) = decode_section_splat_data(&payload, &header, options.sh_degree())?;
    log_stats(&stats);
    Ok(array)
}

/// Serializes every splat of `buffer` into `out` at `out_offset`.
///
/// `header` must have been decoded from `buffer`.
pub fn parse_to_splat_buffer(
    buffer: &[u8],
    header: &PlyHeader,
    out: &mut [u8],
    out_offset: usize,
    options: &DecodeOptions,
) -> Result<DecodeStats> {
    if header.record_count == 0 {
        return Ok(DecodeStats::default());
    }
    let payload = PayloadView::new(buffer, header.encoding);
    let serializer = BufferSerializer::new(header, payload, header.header_byte_length);
    write_all_rows(&serializer, header.record_count - 1, out, out_offset, options)
}

#[cfg(feature = "parallel")]
fn write_all_rows(
    serializer: &BufferSerializer<'_>,
    to: usize,
    out: &mut [u8],
    out_offset: usize,
    options: &DecodeOptions,
) -> Result<DecodeStats> {
    if options.parallel() {
        serializer.write_rows_parallel(0, to, out, out_offset, options.sh_degree())
    } else {
        serializer.write_rows(0, to, out, out_offset, options.sh_degree())
    }
}

#[cfg(not(feature = "parallel"))]
fn write_all_rows(
    serializer: &BufferSerializer<'_>,
    to: usize,
    out: &mut [u8],
    out_offset: usize,
    options: &DecodeOptions,
) -> Result<DecodeStats> {
    if options.parallel() {
        log::debug!("Parallel decoding requested without the parallel feature");
    }
    serializer.write_rows(0, to, out, out_offset, options.sh_degree())
}

fn log_header(header: &PlyHeader, total_len: usize) {
    log::debug!(
        "PLY header: {} splats, {} bytes per splat, header {} bytes, sh degree {}",
        header.record_count,
        header.bytes_per_record,
        header.header_byte_length,
        header.sh_degree
    );
    let expected = header.expected_total_length();
    if total_len != expected {
        log::warn!("PLY buffer is {total_len} bytes but its header describes {expected}");
    }
}

fn log_stats(stats: &DecodeStats) {
    log::debug!("Decoded {} splats", stats.rows);
    if stats.degenerate_rotations > 0 {
        log::warn!(
            "{} splats had missing or zero-length rotations, using identity",
            stats.degenerate_rotations
        );
    }
}
