//! The read seam between the sampler and the `/proc` feeds.
//!
//! Every feed the collector consumes (`meminfo`, `stat`, `diskstats`,
//! `net/dev`) is fetched through [`FileSystem`], so a cycle can be replayed
//! against [`MockFs`](crate::collector::MockFs) fixtures or a captured tree.

use std::io;
use std::path::Path;

/// Source of feed contents.
///
/// Feeds are small text files read whole, once per metric per cycle. An
/// `Err` is turned into the metric's sentinel by the collector.
pub trait FileSystem: Send + Sync {
    /// Returns the full text of the feed at `path`.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Reports whether `path` exists; used to warn about a missing proc root.
    fn exists(&self, path: &Path) -> bool;
}

/// Reads feeds straight from the host through `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
