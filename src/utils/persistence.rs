use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{errors::StorageError, schedule::ScheduledTransaction};

/// On-disk collection of scheduled transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScheduleBook {
    #[serde(default)]
    pub schedules: Vec<ScheduledTransaction>,
}

/// Writes the provided book to disk atomically by staging to a temporary file.
pub fn save_book_to_file(book: &ScheduleBook, path: &Path) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(book)?;
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    tracing::debug!(
        path = %path.display(),
        schedules = book.schedules.len(),
        "schedule book saved"
    );
    Ok(())
}

/// Loads a schedule book from disk, returning structured errors on failure.
///
/// Schedule ids must be unique within a book.
pub fn load_book_from_file(path: &Path) -> Result<ScheduleBook, StorageError> {
    let data = fs::read_to_string(path)?;
    let book: ScheduleBook = serde_json::from_str(&data)?;
    let mut seen = HashSet::with_capacity(book.schedules.len());
    if let Some(duplicate) = book.schedules.iter().find(|s| !seen.insert(s.id)) {
        return Err(StorageError::DuplicateSchedule(duplicate.id));
    }
    Ok(book)
}
