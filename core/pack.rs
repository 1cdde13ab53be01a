//! Packing of a collected manifest into a single brotli-compressed blob.
//!
//! The uncompressed frame is little-endian:
//!
//! ```text
//! "APK1" | u32 count | count * (u32 path_len | path | u64 size | content)
//! ```
//!
//! Paths are stored as UTF-8 with `/` separators. The same records and
//! quality always produce the same bytes.

use crate::config::{MAX_QUALITY, MIN_QUALITY};
use crate::error::{AppError, Result};
use crate::gather::FileRecord;
use brotli::enc::BrotliEncoderParams;
use log;
use std::path::{MAIN_SEPARATOR, PathBuf};

const MAGIC: &[u8; 4] = b"APK1";
const LG_WINDOW: i32 = 22;

/// Encodes `files` in order and compresses the result at `quality` (1-11).
pub fn pack(files: &[FileRecord], quality: u32) -> Result<Vec<u8>> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(AppError::Pack(format!(
            "unsupported compression quality {} (expected {}-{})",
            quality, MIN_QUALITY, MAX_QUALITY
        )));
    }

    let frame = encode_frame(files)?;
    log::debug!(
        "Encoded {} files into a {} byte frame, compressing at quality {}",
        files.len(),
        frame.len(),
        quality
    );

    let mut params = BrotliEncoderParams::default();
    params.quality = quality as i32;
    params.lgwin = LG_WINDOW;

    let mut compressed = Vec::new();
    brotli::BrotliCompress(&mut frame.as_slice(), &mut compressed, &params)
        .map_err(|e| AppError::Pack(format!("brotli compression failed: {}", e)))?;
    Ok(compressed)
}

/// Reverses [`pack`].
pub fn unpack(blob: &[u8]) -> Result<Vec<FileRecord>> {
    let mut frame = Vec::new();
    brotli::BrotliDecompress(&mut &blob[..], &mut frame)
        .map_err(|e| AppError::Pack(format!("brotli decompression failed: {}", e)))?;
    decode_frame(&frame)
}

fn encode_frame(files: &[FileRecord]) -> Result<Vec<u8>> {
    let capacity = files
        .iter()
        .map(|f| f.content.len() + f.path.as_os_str().len() + 12)
        .sum::<usize>()
        + 8;
    let mut frame = Vec::with_capacity(capacity);
    frame.extend_from_slice(MAGIC);
    frame.extend_from_slice(&len_u32(files.len(), "file count")?.to_le_bytes());

    for file in files {
        let path = stored_path(file)?;
        frame.extend_from_slice(&len_u32(path.len(), "path length")?.to_le_bytes());
        frame.extend_from_slice(path.as_bytes());
        frame.extend_from_slice(&(file.content.len() as u64).to_le_bytes());
        frame.extend_from_slice(&file.content);
    }
    Ok(frame)
}

fn stored_path(file: &FileRecord) -> Result<String> {
    let path = file.path.to_str().ok_or_else(|| {
        AppError::Pack(format!(
            "path is not valid UTF-8: {}",
            file.path.display()
        ))
    })?;
    Ok(path.replace(MAIN_SEPARATOR, "/"))
}

fn len_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| AppError::Pack(format!("{} {} does not fit in u32", what, len)))
}

struct FrameReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| AppError::Pack(format!("truncated bundle at offset {}", self.pos)))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }
}

fn decode_frame(frame: &[u8]) -> Result<Vec<FileRecord>> {
    let mut reader = FrameReader {
        data: frame,
        pos: 0,
    };
    if reader.take(MAGIC.len())? != MAGIC {
        return Err(AppError::Pack("not an assetpack bundle".to_string()));
    }

    let count = reader.u32()?;
    let mut files = Vec::new();
    for _ in 0..count {
        let path_len = reader.u32()? as usize;
        let path = std::str::from_utf8(reader.take(path_len)?)
            .map_err(|e| AppError::Pack(format!("invalid path in bundle: {}", e)))?;
        let size = reader.u64()?;
        let len = usize::try_from(size)
            .map_err(|_| AppError::Pack(format!("entry {} is too large", path)))?;
        let content = reader.take(len)?.to_vec();
        files.push(FileRecord {
            path: PathBuf::from(path),
            size,
            content,
        });
    }

    if reader.pos != frame.len() {
        return Err(AppError::Pack(format!(
            "{} trailing bytes after last entry",
            frame.len() - reader.pos
        )));
    }
    Ok(files)
}

/// A packed blob embedded by generated code.
#[derive(Debug, Clone, Copy)]
pub struct Bundle {
    decompress: bool,
    data: &'static [u8],
}

impl Bundle {
    pub const fn new(decompress: bool, data: &'static [u8]) -> Self {
        Self { decompress, data }
    }

    /// Whether file contents are meant to be decompressed lazily on read.
    pub fn decompress(&self) -> bool {
        self.decompress
    }

    pub fn data(&self) -> &'static [u8] {
        self.data
    }

    pub fn unpack(&self) -> Result<Vec<FileRecord>> {
        unpack(self.data)
    }
}
