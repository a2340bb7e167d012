// Transparent gzip handling for calibration archives

use crate::core::constants::GZIP_MAGIC;
use crate::core::error::{CalError, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::Path;

pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Returns the text content, inflating it first when it carries the gzip magic.
pub fn decode_text(data: Vec<u8>) -> Result<String> {
    if !is_gzip(&data) {
        return Ok(String::from_utf8(data)?);
    }

    let mut decoder = GzDecoder::new(data.as_slice());
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CalError::DecompressionFailed(format!("Gzip: {}", e)))?;
    Ok(String::from_utf8(decompressed)?)
}

pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let data = fs::read(path.as_ref())?;
    decode_text(data)
}
