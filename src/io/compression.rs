//! Transparent compression for record sources and table sinks.
//!
//! Inputs are decompressed by file extension first and by magic bytes second, so a
//! gzip body served from a URL without a `.gz` suffix still reads correctly. Outputs
//! are compressed by extension only.
//!
//! ## Built-in codecs
//! - **Gzip** (`.gz`) via `flate2` (feature `compression-gzip`)
//! - **Zstd** (`.zst`) via `zstd` (feature `compression-zstd`)
//! - **Bzip2** (`.bz2`) via `bzip2` (feature `compression-bzip2`)
//! - **Xz** (`.xz`) via `xz2` (feature `compression-xz`)
//!
//! Additional codecs can be added at runtime with [`register_codec`].
//!
//! ```no_run
//! use pathpivot::io::compression::auto_detect_reader;
//! use std::fs::File;
//! # fn main() -> anyhow::Result<()> {
//! let file = File::open("events/a.csv.gz")?;
//! let reader = auto_detect_reader(file, "events/a.csv.gz")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

static CODEC_REGISTRY: RwLock<Option<Vec<Arc<dyn CompressionCodec>>>> = RwLock::new(None);

fn builtin_codecs() -> Vec<Arc<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Arc::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Arc::new(ZstdCodec),
        #[cfg(feature = "compression-bzip2")]
        Arc::new(Bzip2Codec),
        #[cfg(feature = "compression-xz")]
        Arc::new(XzCodec),
    ]
}

fn codecs() -> Vec<Arc<dyn CompressionCodec>> {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(builtin_codecs).clone()
}

/// Register an additional codec. It is consulted after the built-in ones.
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(builtin_codecs).push(codec);
}

/// A streaming compression format.
///
/// Implementations live in a process-wide registry and must be `Send + Sync`.
pub trait CompressionCodec: Send + Sync {
    /// Short name used in error context, e.g. `"gzip"`.
    fn name(&self) -> &str;

    /// Lowercase extensions including the dot, e.g. `&[".gz"]`.
    fn extensions(&self) -> &[&str];

    /// Leading bytes identifying the format, if it has any.
    fn magic_bytes(&self) -> Option<&[u8]>;

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn FinishWrite>>;
}

/// A writer whose stream must be closed explicitly.
///
/// Encoders emit trailers (gzip CRC, xz index, …) on close. Dropping them closes the
/// stream too, but any error is lost; [`finish_stream`](Self::finish_stream) reports it.
pub trait FinishWrite: Write {
    /// Write trailers and flush everything down to the underlying writer.
    fn finish_stream(self: Box<Self>) -> std::io::Result<()>;
}

impl FinishWrite for Box<dyn Write> {
    fn finish_stream(mut self: Box<Self>) -> std::io::Result<()> {
        self.flush()
    }
}

fn detect_from_extension(hint: &str) -> Option<Arc<dyn CompressionCodec>> {
    let hint = hint.to_ascii_lowercase();
    codecs()
        .into_iter()
        .find(|c| c.extensions().iter().any(|ext| hint.ends_with(ext)))
}

fn detect_from_magic<R: BufRead>(reader: &mut R) -> Option<Arc<dyn CompressionCodec>> {
    let buf = reader.fill_buf().ok()?;
    if buf.is_empty() {
        return None;
    }
    codecs()
        .into_iter()
        .find(|c| c.magic_bytes().is_some_and(|magic| buf.starts_with(magic)))
}

/// Strip a recognized compression suffix: `out.csv.gz` becomes `out.csv`.
pub fn strip_compression_suffix(name: &str) -> &str {
    match detect_from_extension(name) {
        Some(codec) => {
            let lower = name.to_ascii_lowercase();
            codec
                .extensions()
                .iter()
                .find(|ext| lower.ends_with(*ext))
                .map_or(name, |ext| &name[..name.len() - ext.len()])
        }
        None => name,
    }
}

/// Wrap `reader` with a decompressor when `hint` (a path or URL) or the stream's
/// leading bytes name a registered codec. Plain input comes back buffered.
pub fn auto_detect_reader<R: Read + 'static>(reader: R, hint: impl AsRef<str>) -> Result<Box<dyn Read>> {
    let hint = hint.as_ref();
    if let Some(codec) = detect_from_extension(hint) {
        return codec
            .wrap_reader_dyn(Box::new(reader))
            .with_context(|| format!("wrap {hint} with {} decoder", codec.name()));
    }

    let mut buffered = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&mut buffered) {
        return codec
            .wrap_reader_dyn(Box::new(buffered))
            .with_context(|| format!("wrap {hint} with {} decoder", codec.name()));
    }
    Ok(Box::new(buffered))
}

/// Wrap `writer` with a compressor chosen by the extension of `path`.
///
/// The result must be closed with [`FinishWrite::finish_stream`]; otherwise a failed
/// trailer write goes unnoticed.
pub fn auto_detect_writer<W: Write + 'static>(writer: W, path: impl AsRef<Path>) -> Result<Box<dyn FinishWrite>> {
    let hint = path.as_ref().to_string_lossy();
    let buffered: Box<dyn Write> = Box::new(BufWriter::new(writer));
    if let Some(codec) = detect_from_extension(&hint) {
        return codec
            .wrap_writer_dyn(buffered)
            .with_context(|| format!("wrap {hint} with {} encoder", codec.name()));
    }
    Ok(Box::new(buffered))
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        // Multi-member archives are common when files are concatenated server side.
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn FinishWrite>> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        Ok(Box::new(GzEncoder::new(writer, Compression::default())))
    }
}

#[cfg(feature = "compression-gzip")]
impl FinishWrite for flate2::write::GzEncoder<Box<dyn Write>> {
    fn finish_stream(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = flate2::write::GzEncoder::finish(*self)?;
        inner.flush()
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x28, 0xb5, 0x2f, 0xfd])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn FinishWrite>> {
        zstd::stream::write::Encoder::new(writer, 3).map(|e| Box::new(e) as Box<dyn FinishWrite>)
    }
}

#[cfg(feature = "compression-zstd")]
impl FinishWrite for zstd::stream::write::Encoder<'static, Box<dyn Write>> {
    fn finish_stream(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = zstd::stream::write::Encoder::finish(*self)?;
        inner.flush()
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(b"BZh")
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(bzip2::read::BzDecoder::new(reader)))
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn FinishWrite>> {
        use bzip2::Compression;
        use bzip2::write::BzEncoder;
        Ok(Box::new(BzEncoder::new(writer, Compression::default())))
    }
}

#[cfg(feature = "compression-bzip2")]
impl FinishWrite for bzip2::write::BzEncoder<Box<dyn Write>> {
    fn finish_stream(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = bzip2::write::BzEncoder::finish(*self)?;
        inner.flush()
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(xz2::read::XzDecoder::new(reader)))
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(xz2::write::XzEncoder::new(writer, 6)))
    }
}

#[cfg(feature = "compression-xz")]
impl FinishWrite for xz2::write::XzEncoder<Box<dyn Write>> {
    fn finish_stream(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = xz2::write::XzEncoder::finish(*self)?;
        inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_input_passes_through() -> Result<()> {
        let mut out = String::new();
        auto_detect_reader(&b"user_id,path,length\n"[..], "a.csv")?.read_to_string(&mut out)?;
        assert_eq!(out, "user_id,path,length\n");
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_detected_by_magic_without_suffix() -> Result<()> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"u1,/a,5\n")?;
        let bytes = enc.finish()?;

        let mut out = String::new();
        auto_detect_reader(std::io::Cursor::new(bytes), "https://host/data/a")?.read_to_string(&mut out)?;
        assert_eq!(out, "u1,/a,5\n");
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn suffix_is_stripped_case_insensitively() {
        assert_eq!(strip_compression_suffix("out.csv.GZ"), "out.csv");
        assert_eq!(strip_compression_suffix("out.csv"), "out.csv");
    }
}
