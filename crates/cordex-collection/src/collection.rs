//! Collection enumerator: discovers eligible files under a root and opens
//! one segment per file. It never parses content itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cordex_common::{CollectionConfig, CollectionKind};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{CollectionError, Result};
use crate::segment::Segment;
use crate::side_file::SideFileLayout;

#[derive(Debug, Clone)]
pub struct Collection {
    kind: CollectionKind,
    root: PathBuf,
    layout: Arc<SideFileLayout>,
}

impl Collection {
    pub fn new(config: &CollectionConfig) -> Self {
        Self {
            kind: config.kind,
            root: config.root.clone(),
            layout: Arc::new(SideFileLayout::from_config(config)),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files under the root accepted by this collection's suffix filter,
    /// sorted by path. Hidden entries are skipped; unreadable directory
    /// entries are logged and skipped.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Err(CollectionError::RootNotFound(self.root.clone()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && self.kind.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        info!(kind = %self.kind, root = %self.root.display(), files = files.len(), "Discovered collection files");
        Ok(files)
    }

    /// Open the segment for one discovered file.
    pub fn open_segment(&self, path: &Path) -> Result<Segment> {
        debug!(path = %path.display(), "Opening segment");
        Segment::open(self.kind, path, Arc::clone(&self.layout))
    }

    /// Discover files, then open their segments lazily in path order.
    /// A file that fails to open yields its error without stopping the rest.
    pub fn segments(&self) -> Result<impl Iterator<Item = (PathBuf, Result<Segment>)> + '_> {
        let files = self.discover()?;
        Ok(files.into_iter().map(move |path| {
            let segment = self.open_segment(&path);
            (path, segment)
        }))
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
