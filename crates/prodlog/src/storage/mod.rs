//! Storage layer for prodlog.
//!
//! Records live in a single CSV file and are mirrored in memory. Every
//! mutation rewrites the whole file, so the store assumes a single user.

pub mod columns;

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{NewRecord, ProductionRecord};

use columns::ColumnIndex;

/// Record store backed by a flat CSV file.
///
/// Provides:
/// - Loading the file on open (a missing file is an empty store)
/// - Appending entries under a fresh stable id
/// - Deleting by row position or by id
/// - Exporting the collection to another file
#[derive(Debug)]
pub struct RecordStore {
    /// Path to the data file.
    path: PathBuf,
    /// In-memory mirror of the file, in file order.
    records: Vec<ProductionRecord>,
    /// Id handed to the next appended record.
    next_id: u64,
}

impl RecordStore {
    /// Open the store at the given path, loading any existing rows.
    ///
    /// Nothing is created on disk until the first mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if path.exists() {
            debug!("Loading records from {}", path.display());
            load(&path)?
        } else {
            debug!("No data file at {}, starting empty", path.display());
            Vec::new()
        };

        // `load` rejects an id with no successor, so this cannot overflow.
        let next_id = records.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        info!("Opened {} with {} records", path.display(), records.len());
        Ok(Self {
            path,
            records,
            next_id,
        })
    }

    /// Get the path to the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, in stored order.
    #[must_use]
    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by its id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&ProductionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Row position of the record with the given id.
    #[must_use]
    pub fn position(&self, id: u64) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Append an entry under a fresh id and persist the collection.
    ///
    /// If the file cannot be written the entry is dropped again, leaving the
    /// store as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn append(&mut self, entry: NewRecord) -> Result<&ProductionRecord> {
        let id = self.next_id;
        let following = id
            .checked_add(1)
            .ok_or_else(|| Error::invalid_field("id", "no ids left to assign"))?;
        self.records.push(ProductionRecord::new(id, entry));

        if let Err(e) = self.save() {
            self.records.pop();
            return Err(e);
        }

        self.next_id = following;
        info!("Saved record {} to {}", id, self.path.display());
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// Delete the record at a row position and persist the collection.
    ///
    /// The remaining records keep their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowOutOfRange`] if there is no such row, or an error
    /// if the data file cannot be written.
    pub fn delete_at(&mut self, index: usize) -> Result<ProductionRecord> {
        if index >= self.records.len() {
            return Err(Error::RowOutOfRange {
                index,
                len: self.records.len(),
            });
        }

        let removed = self.records.remove(index);
        if let Err(e) = self.save() {
            self.records.insert(index, removed);
            return Err(e);
        }

        info!("Deleted row {} (record {})", index, removed.id);
        Ok(removed)
    }

    /// Delete the record with the given id and persist the collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no record has this id, or an
    /// error if the data file cannot be written.
    pub fn delete(&mut self, id: u64) -> Result<ProductionRecord> {
        let index = self.position(id).ok_or(Error::RecordNotFound { id })?;
        self.delete_at(index)
    }

    /// Rewrite the data file from the in-memory collection.
    ///
    /// Creates the parent directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self) -> Result<()> {
        write_file(&self.path, &self.records)?;
        debug!(
            "Wrote {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Write the collection to another CSV file.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written.
    pub fn export(&self, dest: impl AsRef<Path>) -> Result<usize> {
        let dest = dest.as_ref();
        write_file(dest, &self.records)?;
        info!("Exported {} records to {}", self.records.len(), dest.display());
        Ok(self.records.len())
    }
}

/// Write records as CSV, header first.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_csv<W: Write>(writer: W, records: &[ProductionRecord]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(columns::header())?;
    for record in records {
        writer.write_record(columns::encode(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_file(path: &Path, records: &[ProductionRecord]) -> Result<()> {
    let write_err = |source| Error::StorageWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Rows go to a sibling file that replaces the target only once complete.
    let mut staged = NamedTempFile::new_in(parent).map_err(|e| write_err(e.into()))?;
    write_csv(&mut staged, records).map_err(write_err)?;
    staged.persist(path).map_err(|e| write_err(e.error.into()))?;
    Ok(())
}

/// Load every row of a data file.
///
/// Rows without an id (files written before ids existed) are numbered after
/// the highest id present, in file order.
fn load(path: &Path) -> Result<Vec<ProductionRecord>> {
    let read_err = |source| Error::StorageRead {
        path: path.to_path_buf(),
        source,
    };

    // Short rows are reported by `decode` with their line and column.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    // An empty file has no header row.
    let header = reader.headers().map_err(read_err)?.clone();
    if header.is_empty() {
        return Ok(Vec::new());
    }
    let index = ColumnIndex::from_header(&header)?;

    let mut decoded = Vec::new();
    for row in reader.records() {
        let row = row.map_err(read_err)?;
        let line = row.position().map_or(0, csv::Position::line);
        let (id, entry) = index.decode(&row)?;
        decoded.push((line, id, entry));
    }

    let mut seen = HashSet::new();
    let mut highest: Option<(u64, u64)> = None;
    for (line, id, _) in &decoded {
        if let Some(id) = *id {
            if !seen.insert(id) {
                return Err(Error::malformed_row(
                    *line,
                    columns::ID,
                    format!("duplicate id {id}"),
                ));
            }
            match highest {
                Some((max, _)) if max >= id => {}
                _ => highest = Some((id, *line)),
            }
        }
    }

    let mut next_id = match highest {
        Some((max, line)) => max
            .checked_add(1)
            .ok_or_else(|| Error::malformed_row(line, columns::ID, "id is too large"))?,
        None => 1,
    };
    let mut records = Vec::with_capacity(decoded.len());
    for (line, id, entry) in decoded {
        let id = match id {
            Some(id) => id,
            None => {
                let assigned = next_id;
                next_id = next_id
                    .checked_add(1)
                    .ok_or_else(|| Error::malformed_row(line, columns::ID, "id is too large"))?;
                assigned
            }
        };
        records.push(ProductionRecord::new(id, entry));
    }
    if !index.has_id() {
        debug!("{} has no Id column, assigned ids 1..={}", path.display(), records.len());
    }
    Ok(records)
}
