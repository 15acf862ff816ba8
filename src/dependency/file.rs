// src/dependency/file.rs

//! File-based dependency managers.
//!
//! Both managers gate on their edges first, so a prerequisite job that is
//! expected to produce a file gets to run before the file is inspected.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::dependency::{DependencyManager, DependencyState, EdgeResolver, EdgeSet};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// `Passed` if `path` exists, `Ready` otherwise.
///
/// Models jobs whose only purpose is to produce a file.
#[derive(Debug, Clone)]
pub struct CreatesFile {
    path: PathBuf,
    edges: EdgeSet,
    fs: Arc<dyn FileSystem>,
}

impl CreatesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(path, Arc::new(RealFileSystem))
    }

    pub fn with_fs(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            edges: EdgeSet::new(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DependencyManager for CreatesFile {
    fn kind(&self) -> &'static str {
        "create-file"
    }

    fn state(&self, resolver: &dyn EdgeResolver) -> DependencyState {
        if let Some(state) = self.edges.gate(resolver) {
            return state;
        }

        if self.fs.exists(&self.path) {
            debug!(path = ?self.path, "target file exists; dependency passed");
            DependencyState::Passed
        } else {
            DependencyState::Ready
        }
    }

    fn edges(&self) -> &[String] {
        self.edges.as_slice()
    }

    fn add_edge(&mut self, id: &str) -> Result<()> {
        self.edges.add(id)
    }
}

/// Make-style freshness check.
///
/// `Passed` when every target exists and the oldest target is at least as
/// new as the newest source. A missing target means `Ready`; a missing or
/// unreadable source means `Unresolved`.
#[derive(Debug, Clone)]
pub struct LocalFile {
    targets: Vec<PathBuf>,
    sources: Vec<PathBuf>,
    edges: EdgeSet,
    fs: Arc<dyn FileSystem>,
}

impl LocalFile {
    pub fn new(targets: Vec<PathBuf>, sources: Vec<PathBuf>) -> Self {
        Self::with_fs(targets, sources, Arc::new(RealFileSystem))
    }

    pub fn with_fs(targets: Vec<PathBuf>, sources: Vec<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            targets,
            sources,
            edges: EdgeSet::new(),
            fs,
        }
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    fn oldest_target(&self) -> Option<SystemTime> {
        let mut oldest: Option<SystemTime> = None;

        for target in &self.targets {
            if !self.fs.is_file(target) {
                return None;
            }
            let modified = match self.fs.modified(target) {
                Ok(t) => t,
                Err(err) => {
                    warn!(path = ?target, error = %err, "cannot read target timestamp");
                    return None;
                }
            };
            oldest = Some(oldest.map_or(modified, |o| o.min(modified)));
        }

        oldest
    }

    fn newest_source(&self) -> std::result::Result<Option<SystemTime>, ()> {
        let mut newest: Option<SystemTime> = None;

        for source in &self.sources {
            let modified = match self.fs.modified(source) {
                Ok(t) => t,
                Err(err) => {
                    warn!(path = ?source, error = %err, "cannot read source timestamp");
                    return Err(());
                }
            };
            newest = Some(newest.map_or(modified, |n| n.max(modified)));
        }

        Ok(newest)
    }
}

impl DependencyManager for LocalFile {
    fn kind(&self) -> &'static str {
        "local-file"
    }

    fn state(&self, resolver: &dyn EdgeResolver) -> DependencyState {
        if let Some(state) = self.edges.gate(resolver) {
            return state;
        }

        if self.targets.is_empty() {
            return DependencyState::Ready;
        }

        let Some(oldest_target) = self.oldest_target() else {
            return DependencyState::Ready;
        };

        match self.newest_source() {
            Err(()) => DependencyState::Unresolved,
            Ok(None) => DependencyState::Passed,
            Ok(Some(newest_source)) if oldest_target >= newest_source => {
                DependencyState::Passed
            }
            Ok(Some(_)) => DependencyState::Ready,
        }
    }

    fn edges(&self) -> &[String] {
        self.edges.as_slice()
    }

    fn add_edge(&mut self, id: &str) -> Result<()> {
        self.edges.add(id)
    }
}
