//! Input data handling for cache simulation
//!
//! Request logs are CSV files with a `timestamp,key,size,ttl` header, one
//! request per row. A directory of logs is read in file-name order and
//! streamed one request at a time, so memory use does not grow with the trace.

use crate::models::Request;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Error types for log parsing
#[derive(Debug)]
pub enum LogParseError {
    Io(io::Error),
    Csv(csv::Error),
}

impl fmt::Display for LogParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogParseError::Io(err) => write!(f, "I/O error: {err}"),
            LogParseError::Csv(err) => write!(f, "malformed request log: {err}"),
        }
    }
}

impl std::error::Error for LogParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogParseError::Io(err) => Some(err),
            LogParseError::Csv(err) => Some(err),
        }
    }
}

impl From<io::Error> for LogParseError {
    fn from(err: io::Error) -> Self {
        LogParseError::Io(err)
    }
}

impl From<csv::Error> for LogParseError {
    fn from(err: csv::Error) -> Self {
        LogParseError::Csv(err)
    }
}

/// Reader for cache request logs
#[derive(Debug)]
pub struct LogReader {
    input_dir: PathBuf,
}

impl LogReader {
    pub fn new<P: AsRef<Path>>(input_dir: P) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
        }
    }

    /// Get all log files in the input directory, sorted by name
    pub fn get_log_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut log_files = Vec::new();
        for entry in fs::read_dir(&self.input_dir)? {
            let path = entry?.path();
            let is_log = path
                .extension()
                .is_some_and(|ext| ext == "csv" || ext == "log" || ext == "txt");
            if path.is_file() && is_log {
                log_files.push(path);
            }
        }
        log_files.sort();
        Ok(log_files)
    }

    /// Parse one log file into memory
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Request>, LogParseError> {
        let mut requests = Vec::new();
        for request in open_csv(path.as_ref())?.into_deserialize::<Request>() {
            requests.push(request?);
        }
        Ok(requests)
    }

    /// Streams every request in every log file, file by file.
    pub fn stream_requests(&self) -> Result<RequestIterator, LogParseError> {
        Ok(RequestIterator::new(self.get_log_files()?))
    }
}

fn open_csv(path: &Path) -> Result<csv::Reader<BufReader<File>>, LogParseError> {
    let file = File::open(path)?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(BufReader::with_capacity(1024 * 1024, file)))
}

/// Iterator that streams requests from multiple log files
pub struct RequestIterator {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<csv::DeserializeRecordsIntoIter<BufReader<File>, Request>>,
}

impl RequestIterator {
    fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
        }
    }
}

impl fmt::Debug for RequestIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestIterator")
            .field("remaining_files", &self.files.len())
            .field("open", &self.current.is_some())
            .finish()
    }
}

impl Iterator for RequestIterator {
    type Item = Result<Request, LogParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(records) = &mut self.current {
                match records.next() {
                    Some(record) => return Some(record.map_err(LogParseError::from)),
                    None => self.current = None,
                }
            }

            let path = self.files.next()?;
            match open_csv(&path) {
                Ok(reader) => self.current = Some(reader.into_deserialize()),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
