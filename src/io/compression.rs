//! Transparent compression for text billing exports.
//!
//! CUR text files are commonly delivered as `.csv.gz`; other codecs show up
//! when exports are re-packed by hand. Detection is extension-first with a
//! magic-byte fallback, and every codec streams: nothing is decompressed
//! into memory ahead of the reader.
//!
//! Codecs are compiled in per feature flag:
//! - **Gzip** (`.gz`) - `compression-gzip`
//! - **Zstd** (`.zst`) - `compression-zstd`
//! - **Bzip2** (`.bz2`) - `compression-bzip2`
//! - **Xz** (`.xz`) - `compression-xz`

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A streaming compression codec.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g. "gzip").
    fn name(&self) -> &'static str;

    /// Lowercase file extensions, leading dot included.
    fn extensions(&self) -> &'static [&'static str];

    /// Leading bytes identifying the format, if it has a reliable signature.
    fn magic_bytes(&self) -> Option<&'static [u8]>;

    fn wrap_reader(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>>;

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>>;
}

static CODECS: &[&dyn CompressionCodec] = &[
    #[cfg(feature = "compression-gzip")]
    &GzipCodec,
    #[cfg(feature = "compression-zstd")]
    &ZstdCodec,
    #[cfg(feature = "compression-bzip2")]
    &Bzip2Codec,
    #[cfg(feature = "compression-xz")]
    &XzCodec,
];

/// Codecs available in this build.
pub fn codecs() -> &'static [&'static dyn CompressionCodec] {
    CODECS
}

/// Every extension a compressed source may carry in this build.
pub fn compressed_extensions() -> impl Iterator<Item = &'static str> {
    codecs().iter().flat_map(|c| c.extensions().iter().copied())
}

/// Codec matching the path's extension, case-insensitively.
pub fn detect_from_extension(path: impl AsRef<Path>) -> Option<&'static dyn CompressionCodec> {
    let name = path.as_ref().to_string_lossy().to_lowercase();
    codecs()
        .iter()
        .copied()
        .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
}

fn detect_from_magic<R: BufRead>(reader: &mut R) -> Option<&'static dyn CompressionCodec> {
    let head = reader.fill_buf().ok()?;
    if head.is_empty() {
        return None;
    }
    codecs()
        .iter()
        .copied()
        .find(|c| c.magic_bytes().is_some_and(|m| head.starts_with(m)))
}

/// Wrap `reader` with the decompressor matching `path_hint`, falling back to
/// sniffing magic bytes. Plain input is returned buffered.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> io::Result<Box<dyn Read>> {
    if let Some(codec) = detect_from_extension(&path_hint) {
        tracing::debug!(codec = codec.name(), path = %path_hint.as_ref().display(), "decompressing by extension");
        return codec.wrap_reader(Box::new(BufReader::new(reader)));
    }

    let mut buffered = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&mut buffered) {
        tracing::debug!(codec = codec.name(), path = %path_hint.as_ref().display(), "decompressing by signature");
        return codec.wrap_reader(Box::new(buffered));
    }

    Ok(Box::new(buffered))
}

/// Wrap `writer` with the compressor matching `path_hint`'s extension.
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> io::Result<Box<dyn Write>> {
    match detect_from_extension(&path_hint) {
        Some(codec) => codec.wrap_writer(Box::new(BufWriter::new(writer))),
        None => Ok(Box::new(BufWriter::new(writer))),
    }
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&'static [u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        // multi-member archives are common for concatenated exports
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(flate2::write::GzEncoder::new(
            writer,
            flate2::Compression::default(),
        )))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> Option<&'static [u8]> {
        Some(&[0x28, 0xb5, 0x2f, 0xfd])
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>> {
        zstd::stream::write::Encoder::new(writer, 3)
            .map(|e| Box::new(e.auto_finish()) as Box<dyn Write>)
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &'static str {
        "bzip2"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".bz2", ".bzip2"]
    }

    fn magic_bytes(&self) -> Option<&'static [u8]> {
        Some(b"BZh")
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(bzip2::write::BzEncoder::new(
            writer,
            bzip2::Compression::default(),
        )))
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &'static str {
        "xz"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> Option<&'static [u8]> {
        Some(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00])
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)))
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(xz2::write::XzEncoder::new(writer, 6)))
    }
}
