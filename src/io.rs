use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::codec::Utf8Transcoder;
use crate::{reviews_from_text, ReviewFeed, ReviewsResult};

/// How a saved export is stored on disk.
#[derive(Debug, Clone)]
pub struct CsvMeta {
    /// e.g. "application/gzip" or "text/csv"
    pub content_type: String,
    /// e.g. "gzip", "zstd", or empty
    pub content_encoding: String,
    /// file name, used for extension fallback
    pub name_hint: String,
    /// charset of the text once decompressed (UTF-8 unless told otherwise)
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for CsvMeta {
    fn default() -> Self {
        Self {
            content_type: String::new(),
            content_encoding: String::new(),
            name_hint: String::new(),
            charset: encoding_rs::UTF_8,
        }
    }
}

impl CsvMeta {
    /// Guess compression from the file extension.
    pub fn for_path(path: &Path) -> Self {
        let name_hint = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let (content_type, content_encoding) =
            match path.extension().and_then(|s| s.to_str()).unwrap_or_default() {
                "gz" => ("application/gzip", "gzip"),
                "zst" => ("application/zstd", "zstd"),
                _ => ("text/csv", ""),
            };

        Self {
            content_type: content_type.into(),
            content_encoding: content_encoding.into(),
            name_hint,
            ..Default::default()
        }
    }

    pub fn with_charset(mut self, charset: &'static encoding_rs::Encoding) -> Self {
        self.charset = charset;
        self
    }

    fn is_gzip(&self) -> bool {
        let ct = self.content_type.to_ascii_lowercase();
        self.has_encoding("gzip")
            || matches!(ct.as_str(), "application/gzip" | "application/x-gzip")
            || self.name_hint.ends_with(".gz")
    }

    fn is_zstd(&self) -> bool {
        self.has_encoding("zstd")
            || self.content_type.eq_ignore_ascii_case("application/zstd")
            || self.name_hint.ends_with(".zst")
    }

    fn has_encoding(&self, name: &str) -> bool {
        self.content_encoding
            .split(',')
            .any(|s| s.trim().eq_ignore_ascii_case(name))
    }
}

/// Wrap a raw reader with decompression and UTF-8 transcoding as `meta` asks.
pub fn build_csv_reader<R>(raw: R, meta: &CsvMeta) -> Box<dyn AsyncRead + Unpin + Send>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = BufReader::new(raw);
    let decompressed: Box<dyn AsyncRead + Unpin + Send> = if meta.is_gzip() {
        Box::new(GzipDecoder::new(buf))
    } else if meta.is_zstd() {
        Box::new(ZstdDecoder::new(buf))
    } else {
        Box::new(buf)
    };

    if meta.charset == encoding_rs::UTF_8 {
        decompressed
    } else {
        let framed = FramedRead::new(decompressed, Utf8Transcoder::new(meta.charset));
        Box::new(StreamReader::new(framed))
    }
}

/// Open a saved export, choosing decompression from its extension.
pub async fn reader_from_path(
    path: &Path,
    charset: &'static encoding_rs::Encoding,
) -> ReviewsResult<(Box<dyn AsyncRead + Unpin + Send>, CsvMeta)> {
    let file = File::open(path).await?;
    let meta = CsvMeta::for_path(path).with_charset(charset);
    debug!(path = %path.display(), encoding = %meta.content_encoding, charset = meta.charset.name(), "opened export");
    Ok((build_csv_reader(file, &meta), meta))
}

/// Read a whole export and run it through the review pipeline.
///
/// Invalid UTF-8 is an error; pass the right charset to [`reader_from_path`].
pub async fn reviews_from_reader<R>(mut reader: R) -> ReviewsResult<ReviewFeed>
where
    R: AsyncRead + Unpin,
{
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    Ok(reviews_from_text(&text))
}
