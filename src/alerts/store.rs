use crate::alerts::document::{encode_map, parse_map, AlertDocument, ALERTS_BY_TIME};
use crate::alerts::record::{AlertRecord, AlertValue, AlertsByTime};
use crate::error::StoreError;
use crate::storage::{FileBackend, StorageBackend};
use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use std::io;
use std::path::PathBuf;

/// Default location of the alert document
pub const DEFAULT_ALERTS_PATH: &str = "alerts.json";

/// Default indentation width of the persisted JSON
pub const DEFAULT_INDENT: usize = 4;

/// Persistent store of time-keyed environmental alerts
///
/// The store owns the current alert document and keeps it in sync with its
/// backend. Every query and mutation reloads the persisted state first, so the
/// in-memory document only ever reflects what was last read or written.
/// Saving merges with whatever is on disk instead of overwriting it: the
/// `active_alerts` and `read_alerts` lists are replaced wholesale, while
/// `alerts_by_time` is merged hour by hour so that alerts written by another
/// process under different hours survive.
///
/// There is no locking. Two processes writing the same file race freely.
#[derive(Debug)]
pub struct AlertStore<B: StorageBackend = FileBackend> {
    /// Where the document is persisted
    backend: B,
    /// Indentation width used when writing
    indent: usize,
    /// Document as last loaded or saved
    current: AlertDocument,
}

impl AlertStore<FileBackend> {
    /// Open the file-backed store at `path` and load its current contents
    ///
    /// A missing or corrupt file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(FileBackend::new(path))
    }
}

impl<B: StorageBackend> AlertStore<B> {
    /// Create a store on top of an arbitrary backend and load its contents
    pub fn with_backend(backend: B) -> Self {
        let mut store = Self {
            backend,
            indent: DEFAULT_INDENT,
            current: AlertDocument::new(),
        };
        store.load();
        store
    }

    /// Set the indentation width used when writing the document
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Human-readable location of the backing storage
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Document as last loaded or saved
    pub fn document(&self) -> &AlertDocument {
        &self.current
    }

    /// Mutable access to the current document, e.g. to update the alert lists
    /// before calling [`save`](Self::save)
    pub fn document_mut(&mut self) -> &mut AlertDocument {
        &mut self.current
    }

    /// Reload the document from the backend
    ///
    /// Never fails: a missing, unreadable or corrupt document is replaced by
    /// the empty document and the problem is logged. Missing fields are filled
    /// with their defaults. Any unsaved changes to the current document are
    /// discarded.
    pub fn load(&mut self) -> &AlertDocument {
        self.current = match self.read_on_disk() {
            Ok(map) => AlertDocument::from_map(&map),
            Err(e) => {
                warn!(
                    "Failed to read alerts from {}, starting empty: {}",
                    self.backend.location(),
                    e
                );
                AlertDocument::new()
            }
        };
        debug!(
            "Loaded {} alerts from {}",
            self.current.alerts_by_time.len(),
            self.backend.location()
        );
        &self.current
    }

    /// Merge the current document into the persisted one and write it back
    ///
    /// On success the current document becomes the merged result, which may
    /// contain hours this store never saw.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persistence` if the existing document cannot be
    /// read or the merged one cannot be written. The current document is left
    /// unchanged in that case.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let merged = self.persist(&self.current)?;
        self.current = merged;
        Ok(())
    }

    /// Merge `document` into the persisted one and write it back
    ///
    /// Same contract as [`save`](Self::save), with `document` standing in for
    /// the current document. On failure the current document is left as is.
    pub fn save_document(&mut self, document: AlertDocument) -> Result<(), StoreError> {
        let merged = self.persist(&document)?;
        self.current = merged;
        Ok(())
    }

    /// Define the alert for `hour`, replacing any existing one
    ///
    /// The document is reloaded first, the alert is set unread, and the result
    /// is saved immediately. The hour format is not checked here.
    pub fn add_alert_by_time(
        &mut self,
        hour: &str,
        parameter: &str,
        value: impl Into<AlertValue>,
        message: &str,
    ) -> Result<(), StoreError> {
        self.load();
        let record = AlertRecord::new(parameter, value, message);
        if self.current.alerts_by_time.insert(hour, record).is_some() {
            debug!("Replacing alert at {}", hour);
        }
        self.save()?;
        info!("Stored alert at {} for {}", hour, parameter);
        Ok(())
    }

    /// Mark the alert at `hour` as read
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the alert existed and was saved as read, `Ok(false)` if
    /// there is no alert at `hour` (nothing is written then).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` or `StoreError::NotAnObject` if an
    /// alert exists at `hour` on disk but is malformed, and
    /// `StoreError::Persistence` if saving fails.
    pub fn mark_alert_read(&mut self, hour: &str) -> Result<bool, StoreError> {
        self.load();
        match self.current.alerts_by_time.get_mut(hour) {
            Some(record) => record.read = true,
            None => {
                if let Some(e) = self.malformed_on_disk(hour) {
                    warn!("Cannot mark alert at {} as read: {}", hour, e);
                    return Err(e);
                }
                debug!("No alert at {} to mark as read", hour);
                return Ok(false);
            }
        }
        self.save()?;
        info!("Marked alert at {} as read", hour);
        Ok(true)
    }

    /// Persisted alerts keyed by hour
    pub fn alerts_by_time(&mut self) -> &AlertsByTime {
        &self.load().alerts_by_time
    }

    /// Persisted alerts not yet read, in insertion order
    ///
    /// Each alert is returned with its hour so callers can sort chronologically.
    pub fn unread_alerts(&mut self) -> Vec<(&str, &AlertRecord)> {
        self.load().unread()
    }

    /// Strictly check every persisted alert record
    ///
    /// # Returns
    ///
    /// The number of records checked; a missing document counts as zero.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` naming the first bad field,
    /// `StoreError::Corrupt` if the document does not parse, or
    /// `StoreError::Persistence` if it cannot be read.
    pub fn validate(&self) -> Result<usize, StoreError> {
        let bytes = match self.backend.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(0),
            Err(e) => return Err(self.persistence_error(e)),
        };
        let map = parse_map(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        AlertDocument::validate_map(&map)
    }

    /// Read, merge and write; returns the merged document without touching
    /// the current one
    fn persist(&self, document: &AlertDocument) -> Result<AlertDocument, StoreError> {
        let mut on_disk = self.read_on_disk().map_err(|e| {
            error!(
                "Error saving alerts: cannot read {}: {}",
                self.backend.location(),
                e
            );
            self.persistence_error(e)
        })?;

        document.merge_into(&mut on_disk)?;
        let encoded = encode_map(&on_disk, self.indent)?;

        if let Err(e) = self.backend.write(&encoded) {
            error!("Error saving alerts to {}: {}", self.backend.location(), e);
            return Err(self.persistence_error(e));
        }

        debug!(
            "Saved alerts to {} ({} bytes)",
            self.backend.location(),
            encoded.len()
        );
        Ok(AlertDocument::from_map(&on_disk))
    }

    /// Raw persisted document; missing or corrupt content reads as empty
    fn read_on_disk(&self) -> io::Result<Map<String, Value>> {
        let bytes = match self.backend.read()? {
            Some(bytes) => bytes,
            None => return Ok(Map::new()),
        };
        match parse_map(&bytes) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(
                    "Alert document at {} is corrupt, treating it as empty: {}",
                    self.backend.location(),
                    e
                );
                Ok(Map::new())
            }
        }
    }

    /// Validation error for a record present on disk at `hour` but left out of
    /// the in-memory view
    fn malformed_on_disk(&self, hour: &str) -> Option<StoreError> {
        let on_disk = self.read_on_disk().ok()?;
        let raw = on_disk.get(ALERTS_BY_TIME)?.get(hour)?;
        AlertRecord::from_json(hour, raw).err()
    }

    fn persistence_error(&self, source: io::Error) -> StoreError {
        StoreError::Persistence {
            path: self.backend.location(),
            source,
        }
    }
}
