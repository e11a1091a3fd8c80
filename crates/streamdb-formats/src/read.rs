//! Offset-based reads with a short-lived file handle
//!
//! Every read opens its own handle, so concurrent readers never share a
//! cursor.

use crate::error::{FormatError, FormatResult};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Read exactly `len` bytes starting at `offset`
pub fn read_range(path: &Path, offset: u64, len: u64) -> FormatResult<Vec<u8>> {
    let capacity = usize::try_from(len).map_err(|_| FormatError::SizeOutOfRange(len))?;

    let mut file = File::open(path)?;
    let remaining = file.metadata()?.len().saturating_sub(offset);
    file.seek(SeekFrom::Start(offset))?;

    // Reservation is bounded by the bytes left in the file
    let reserve = usize::try_from(len.min(remaining)).unwrap_or(capacity);
    let mut data = Vec::with_capacity(reserve);
    file.take(len).read_to_end(&mut data)?;

    if data.len() != capacity {
        return Err(FormatError::ShortRead {
            offset,
            requested: len,
            received: data.len() as u64,
        });
    }

    Ok(data)
}
