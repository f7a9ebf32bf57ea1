//! Feedback Store - Append-Only JSONL
//!
//! One JSON record per line, rotated by size. Rotated files are never
//! rewritten; `read_all` walks them in name order (the timestamped names
//! sort chronologically).

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;

use crate::constants::APP_NAME;
use crate::logic::error::EngineError;

use super::record::FeedbackRecord;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// Contract the training orchestrator consumes. The storage engine behind
/// it is replaceable; only append/read-all semantics are required.
pub trait FeedbackStore: Send + Sync {
    fn append(&self, record: &FeedbackRecord) -> Result<(), EngineError>;
    fn read_all(&self) -> Result<Vec<FeedbackRecord>, EngineError>;
}

pub struct JsonlFeedbackStore {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
}

impl JsonlFeedbackStore {
    pub fn new() -> Result<Self, EngineError> {
        let base_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join("feedback");
        Self::from_path(base_dir)
    }

    pub fn from_path(base_dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self {
            file: Mutex::new(None),
            base_dir,
        })
    }

    fn create_new_file(&self) -> Result<File, EngineError> {
        let filename = format!("feedback-{}.jsonl", Utc::now().format("%Y-%m-%d-%H%M%S"));
        let path = self.base_dir.join(filename);
        Ok(OpenOptions::new().create(true).append(true).open(path)?)
    }

    fn find_latest_file(&self) -> Result<Option<PathBuf>, EngineError> {
        let mut files = self.list_files()?;
        Ok(files.pop())
    }

    fn list_files(&self) -> Result<Vec<PathBuf>, EngineError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "jsonl"))
            .collect();
        files.sort();
        Ok(files)
    }
}

impl FeedbackStore for JsonlFeedbackStore {
    /// Append one record, rotating the file once it crosses the size cap
    fn append(&self, record: &FeedbackRecord) -> Result<(), EngineError> {
        let mut guard = self.file.lock();

        if guard.is_none() {
            *guard = Some(match self.find_latest_file()? {
                Some(path) => {
                    let file = OpenOptions::new().create(true).append(true).open(&path)?;
                    if file.metadata()?.len() < MAX_FILE_SIZE {
                        file
                    } else {
                        self.create_new_file()?
                    }
                }
                None => self.create_new_file()?,
            });
        }

        let should_rotate = guard
            .as_ref()
            .map(|f| f.metadata().map(|m| m.len() >= MAX_FILE_SIZE).unwrap_or(false))
            .unwrap_or(false);
        if should_rotate {
            *guard = Some(self.create_new_file()?);
        }

        if let Some(file) = guard.as_mut() {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{}", json)?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<FeedbackRecord>, EngineError> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for path in self.list_files()? {
            let reader = BufReader::new(File::open(&path)?);
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<FeedbackRecord>(&line) {
                    Ok(record) => records.push(record),
                    Err(_) => skipped += 1,
                }
            }
        }

        if skipped > 0 {
            log::warn!("skipped {} corrupt feedback line(s)", skipped);
        }
        Ok(records)
    }
}

/// Read a feedback directory directly (offline tooling)
pub fn read_feedback_dir(path: &Path) -> Result<Vec<FeedbackRecord>, EngineError> {
    JsonlFeedbackStore::from_path(path)?.read_all()
}

// ============================================================================
// TESTS
// ============================================================================
