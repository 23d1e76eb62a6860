#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Request latencies faceted by colour and city.
pub const SAMPLE_LINES: [&str; 4] = [
    "10.5\tred\tseattle",
    "15.2\tred\tsan jose",
    "8.7\tblue\tseattle",
    "12.1\tblue\tsan jose",
];

pub fn sample_lines() -> Vec<String> {
    SAMPLE_LINES.iter().map(|l| l.to_string()).collect()
}

pub fn write_tsv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

pub fn write_gzip_tsv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    for line in lines {
        writeln!(encoder, "{line}").unwrap();
    }
    encoder.finish().unwrap();
    path
}
