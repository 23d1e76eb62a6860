//! Line ingestion: a reader thread feeding a bounded queue that the UI
//! drains on every tick.

use color_eyre::Result;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::CompressionFormat;

/// Lines buffered between the reader thread and the UI.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Where records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File {
        path: PathBuf,
        compression: Option<CompressionFormat>,
    },
}

impl InputSource {
    /// Build a source from an optional path; compression falls back to the
    /// file extension when not given explicitly.
    pub fn new(path: Option<&Path>, compression: Option<CompressionFormat>) -> Self {
        match path {
            None => InputSource::Stdin,
            Some(path) => InputSource::File {
                path: path.to_path_buf(),
                compression: compression.or_else(|| CompressionFormat::from_extension(path)),
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            InputSource::Stdin => "stdin".to_string(),
            InputSource::File { path, .. } => path.display().to_string(),
        }
    }

    /// Open the source for line reading, decoding compressed files on the fly.
    pub fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        match self {
            InputSource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            InputSource::File { path, compression } => {
                let f = File::open(path).map_err(|e| {
                    color_eyre::eyre::eyre!("Failed to open {}: {}", path.display(), e)
                })?;
                let reader: Box<dyn Read + Send> = match compression {
                    None => Box::new(f),
                    Some(CompressionFormat::Gzip) => {
                        Box::new(flate2::read::MultiGzDecoder::new(BufReader::new(f)))
                    }
                    Some(CompressionFormat::Zstd) => {
                        Box::new(zstd::Decoder::new(BufReader::new(f))?)
                    }
                    Some(CompressionFormat::Bzip2) => {
                        Box::new(bzip2::read::BzDecoder::new(BufReader::new(f)))
                    }
                    Some(CompressionFormat::Xz) => {
                        Box::new(xz2::read::XzDecoder::new(BufReader::new(f)))
                    }
                };
                Ok(Box::new(BufReader::new(reader)))
            }
        }
    }
}

/// Read newline-delimited text, invalid UTF-8 replaced, line endings stripped.
fn read_lines<R: BufRead>(mut reader: R, mut emit: impl FnMut(String) -> bool) -> io::Result<usize> {
    let mut buf = Vec::with_capacity(256);
    let mut count = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(count);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        count += 1;
        if !emit(String::from_utf8_lossy(&buf).into_owned()) {
            return Ok(count);
        }
    }
}

/// Handle to the reader thread and its bounded queue.
///
/// The producer blocks while the queue is full and closes it when the source
/// is exhausted. The consumer side never blocks.
pub struct LineIngestor {
    receiver: Receiver<String>,
    handle: Option<JoinHandle<()>>,
    closed: bool,
    received: usize,
}

impl LineIngestor {
    /// Start reading `reader` on a background thread.
    pub fn spawn<R>(reader: R, capacity: usize, label: String) -> Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = sync_channel::<String>(capacity.max(1));
        let handle = thread::Builder::new()
            .name("facetscope-reader".to_string())
            .spawn(move || {
                log::info!("reading records from {label}");
                match read_lines(reader, |line| tx.send(line).is_ok()) {
                    Ok(count) => log::info!("{label} exhausted after {count} lines"),
                    Err(e) => log::warn!("stopped reading {label}: {e}"),
                }
            })?;

        Ok(Self {
            receiver: rx,
            handle: Some(handle),
            closed: false,
            received: 0,
        })
    }

    /// Open `source` and start reading it.
    pub fn from_source(source: &InputSource, capacity: usize) -> Result<Self> {
        let reader = source.open()?;
        Self::spawn(reader, capacity, source.describe())
    }

    /// Take every line currently queued, up to `limit`, without blocking.
    pub fn drain(&mut self, limit: usize) -> Vec<String> {
        let mut lines = Vec::new();
        while lines.len() < limit {
            match self.receiver.try_recv() {
                Ok(line) => lines.push(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        self.closed = true;
                        if let Some(handle) = self.handle.take() {
                            let _ = handle.join();
                        }
                    }
                    break;
                }
            }
        }
        self.received += lines.len();
        lines
    }

    /// The source is exhausted and every queued line has been drained.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn received(&self) -> usize {
        self.received
    }
}
