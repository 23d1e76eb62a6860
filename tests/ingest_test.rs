mod common;

use common::{write_gzip_tsv, write_tsv, SAMPLE_LINES};
use facetscope::{CompressionFormat, FacetEngine, InputSource, LineIngestor};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn read_all(source: &InputSource) -> Vec<String> {
    let mut ingestor = LineIngestor::from_source(source, 2).expect("open source");
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut lines = Vec::new();
    while !ingestor.is_closed() {
        assert!(Instant::now() < deadline, "reader never finished");
        lines.extend(ingestor.drain(usize::MAX));
        thread::sleep(Duration::from_millis(1));
    }
    lines
}

fn source(path: &Path) -> InputSource {
    InputSource::new(Some(path), None)
}

#[test]
fn test_plain_file() {
    let dir = TempDir::new().unwrap();
    let path = write_tsv(dir.path(), "latency.tsv", &SAMPLE_LINES);
    assert_eq!(read_all(&source(&path)), SAMPLE_LINES);
}

#[test]
fn test_gzip_file_detected_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_gzip_tsv(dir.path(), "latency.tsv.gz", &SAMPLE_LINES);
    assert_eq!(read_all(&source(&path)), SAMPLE_LINES);
}

#[test]
fn test_explicit_compression_overrides_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_gzip_tsv(dir.path(), "latency.log", &SAMPLE_LINES);
    let source = InputSource::new(Some(&path), Some(CompressionFormat::Gzip));
    assert_eq!(read_all(&source), SAMPLE_LINES);
}

#[test]
fn test_other_compression_formats() {
    let dir = TempDir::new().unwrap();
    let text = format!("{}\n", SAMPLE_LINES.join("\n"));

    let zst = dir.path().join("latency.tsv.zst");
    std::fs::write(&zst, zstd::encode_all(text.as_bytes(), 0).unwrap()).unwrap();

    let bz2 = dir.path().join("latency.tsv.bz2");
    let mut encoder =
        bzip2::write::BzEncoder::new(File::create(&bz2).unwrap(), bzip2::Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let xz = dir.path().join("latency.tsv.xz");
    let mut encoder = xz2::write::XzEncoder::new(File::create(&xz).unwrap(), 6);
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();

    for path in [zst, bz2, xz] {
        assert_eq!(read_all(&source(&path)), SAMPLE_LINES, "{}", path.display());
    }
}

#[test]
fn test_ingested_file_feeds_engine() {
    let dir = TempDir::new().unwrap();
    let path = write_tsv(
        dir.path(),
        "mixed.tsv",
        &["1\ta", "", "2\tb", "\u{feff}oops\tc", "3\ta"],
    );
    let mut engine = FacetEngine::new();
    for line in read_all(&source(&path)) {
        engine.ingest(&line);
    }
    assert_eq!(engine.total_records(), 4);
    assert_eq!(engine.full().samples(1, "a"), Some(&[1.0, 3.0][..]));
    assert!(engine.has_string_values());
}
