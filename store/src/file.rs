use std::path::{Path, PathBuf};

use merge1024_core::StatsSink;
use merge1024_protocol::StatsUpload;

use crate::*;

/// Sink that records into a [`StatsStore`] and writes it back to disk after
/// every session.
///
/// Write failures are logged and otherwise ignored so that gameplay never
/// depends on the disk.
#[derive(Debug)]
pub struct FileStatsSink {
    path: PathBuf,
    store: StatsStore,
}

impl FileStatsSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = StatsStore::load(&path)?;
        Ok(Self { path, store })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &StatsStore {
        &self.store
    }
}

impl StatsSink for FileStatsSink {
    fn submit(&mut self, upload: StatsUpload) {
        self.store.record(upload);
        if let Err(err) = self.store.save(&self.path) {
            log::error!(
                "Could not save stats to {}: {}",
                self.path.display(),
                err
            );
        }
    }
}
