use async_compression::tokio::write::{GzipEncoder, ZstdEncoder};
use csv_reviews::{reader_from_path, reviews_from_reader, CsvMeta};
use std::path::Path;
use tokio::io::AsyncWriteExt;

const EXPORT: &str = "Full Name,City / Location,Rating,Feedback\n\
José,\"San José, CA\",5,\"Muy bien, gracias\"\n\
,,4,Quick and careful\n";

async fn write_gzip(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let file = tokio::fs::File::create(path).await?;
    let mut enc = GzipEncoder::new(file);
    enc.write_all(data).await?;
    enc.shutdown().await?;
    Ok(())
}

async fn write_zstd(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let file = tokio::fs::File::create(path).await?;
    let mut enc = ZstdEncoder::new(file);
    enc.write_all(data).await?;
    enc.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn reads_plain_export() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("reviews.csv");
    std::fs::write(&path, EXPORT)?;

    let (reader, meta) = reader_from_path(&path, encoding_rs::UTF_8).await?;
    assert_eq!(meta.content_type, "text/csv");
    let feed = reviews_from_reader(reader).await?;

    assert_eq!(feed.reviews.len(), 2);
    assert_eq!(feed.reviews[0].name, "José");
    assert_eq!(feed.reviews[0].city.as_deref(), Some("San José, CA"));
    assert_eq!(feed.reviews[1].name, "Anonymous");
    assert_eq!(feed.average, 4.5);
    Ok(())
}

#[tokio::test]
async fn reads_gzip_and_zstd_exports() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let gz = dir.path().join("reviews.csv.gz");
    let zst = dir.path().join("reviews.csv.zst");
    write_gzip(&gz, EXPORT.as_bytes()).await?;
    write_zstd(&zst, EXPORT.as_bytes()).await?;

    let plain = csv_reviews::reviews_from_text(EXPORT);
    for path in [&gz, &zst] {
        let (reader, _meta) = reader_from_path(path, encoding_rs::UTF_8).await?;
        let feed = reviews_from_reader(reader).await?;
        assert_eq!(feed, plain, "{}", path.display());
    }
    Ok(())
}

#[tokio::test]
async fn transcodes_windows_1252_export() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("reviews-legacy.csv");
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(EXPORT);
    std::fs::write(&path, &bytes)?;

    let (reader, meta) = reader_from_path(&path, encoding_rs::WINDOWS_1252).await?;
    assert_eq!(meta.charset, encoding_rs::WINDOWS_1252);
    let feed = reviews_from_reader(reader).await?;
    assert_eq!(feed.reviews[0].name, "José");
    assert_eq!(feed.reviews[0].text, "Muy bien, gracias");
    Ok(())
}

#[tokio::test]
async fn utf8_bom_export_is_stripped() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("reviews.csv");
    std::fs::write(&path, format!("\u{feff}{EXPORT}"))?;

    let (reader, _meta) = reader_from_path(&path, encoding_rs::UTF_8).await?;
    let feed = reviews_from_reader(reader).await?;
    assert_eq!(feed.reviews, csv_reviews::reviews_from_text(EXPORT).reviews);
    Ok(())
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let err = reader_from_path(Path::new("/nonexistent/reviews.csv"), encoding_rs::UTF_8)
        .await
        .err()
        .expect("open should fail");
    assert!(matches!(err, csv_reviews::ReviewsError::Io(_)));
}

#[test]
fn meta_from_extension() {
    let gz = CsvMeta::for_path(Path::new("/tmp/export.csv.gz"));
    assert_eq!(gz.content_encoding, "gzip");
    assert_eq!(gz.name_hint, "export.csv.gz");
    let zst = CsvMeta::for_path(Path::new("export.csv.zst"));
    assert_eq!(zst.content_type, "application/zstd");
    let plain = CsvMeta::for_path(Path::new("export.csv"));
    assert_eq!(plain.content_encoding, "");
    assert_eq!(plain.charset, encoding_rs::UTF_8);
}
