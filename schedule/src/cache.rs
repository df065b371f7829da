//! Versioned offline copy of the static assets.
//!
//! Each cache version lives in a directory named after it below the cache
//! root. Installing fills the current version, activating drops every other
//! version, and fetching prefers the cached copy over the network.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::CacheConfig;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        source: std::io::Error,
    },
}

pub trait Network {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, CacheError>;
}

/// Serves assets from a local directory, `./` being its `index.html`.
#[derive(Debug, Clone)]
pub struct DirNetwork {
    root: PathBuf,
}

impl DirNetwork {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Network for DirNetwork {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, CacheError> {
        let relative = path.trim_start_matches("./").trim_start_matches('/');
        let relative = if relative.is_empty() {
            "index.html"
        } else {
            relative
        };
        fs_err::read(self.root.join(relative)).map_err(|source| CacheError::Fetch {
            path: path.to_owned(),
            source,
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Origin {
    Cache,
    Network,
}

pub struct AssetCache {
    root: PathBuf,
    name: String,
    assets: Vec<String>,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, assets: Vec<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            assets,
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &CacheConfig) -> Self {
        Self::new(root, config.name.clone(), config.assets.clone())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn dir(&self) -> PathBuf {
        self.root.join(urlencoding::encode(&self.name).as_ref())
    }

    fn entry(dir: &Path, path: &str) -> PathBuf {
        dir.join(urlencoding::encode(path).as_ref())
    }

    /// Fetches every asset into the current version. Nothing is kept if any
    /// asset fails to download.
    pub fn install(&self, network: &impl Network) -> Result<usize, CacheError> {
        let fetched = self
            .assets
            .iter()
            .map(|path| network.fetch(path).map(|body| (path, body)))
            .collect::<Result<Vec<_>, _>>()?;

        let dir = self.dir();
        fs_err::create_dir_all(&dir)?;
        for (path, body) in &fetched {
            fs_err::write(Self::entry(&dir, path), body)?;
        }
        info!(cache = %self.name, assets = fetched.len(), "cache installed");
        Ok(fetched.len())
    }

    /// Removes every cache version other than the current one and returns
    /// their names.
    pub fn activate(&self) -> Result<Vec<String>, CacheError> {
        let current = self.dir();
        let mut deleted = Vec::new();
        let entries = match fs_err::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(deleted),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() || entry.path() == current {
                continue;
            }
            fs_err::remove_dir_all(entry.path())?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let name = urlencoding::decode(&name)
                .map(|n| n.into_owned())
                .unwrap_or(name);
            info!(cache = %name, "deleted stale cache");
            deleted.push(name);
        }
        deleted.sort();
        Ok(deleted)
    }

    pub fn fetch(&self, path: &str, network: &impl Network) -> Result<(Vec<u8>, Origin), CacheError> {
        match fs_err::read(Self::entry(&self.dir(), path)) {
            Ok(body) => {
                debug!(path, "served from cache");
                Ok((body, Origin::Cache))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path, "cache miss");
                network.fetch(path).map(|body| (body, Origin::Network))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::cache::{AssetCache, CacheError, DirNetwork, Origin};

    fn site(dir: &Path) -> DirNetwork {
        std::fs::write(dir.join("index.html"), "<html>").unwrap();
        std::fs::write(dir.join("app.js"), "init()").unwrap();
        std::fs::write(dir.join("extra.txt"), "extra").unwrap();
        DirNetwork::new(dir)
    }

    fn assets() -> Vec<String> {
        ["./", "./index.html", "./app.js"].map(str::to_owned).to_vec()
    }

    #[test]
    fn test_install_and_fetch() {
        let site_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let network = site(site_dir.path());
        let cache = AssetCache::new(cache_dir.path(), "aim-schedule-v4.9", assets());

        assert_eq!(
            cache.fetch("./app.js", &network).unwrap(),
            (b"init()".to_vec(), Origin::Network)
        );

        assert_eq!(cache.install(&network).unwrap(), 3);
        std::fs::write(site_dir.path().join("app.js"), "changed()").unwrap();

        assert_eq!(
            cache.fetch("./app.js", &network).unwrap(),
            (b"init()".to_vec(), Origin::Cache)
        );
        assert_eq!(
            cache.fetch("./", &network).unwrap(),
            (b"<html>".to_vec(), Origin::Cache)
        );
        assert_eq!(
            cache.fetch("./extra.txt", &network).unwrap(),
            (b"extra".to_vec(), Origin::Network)
        );
        assert!(matches!(
            cache.fetch("./missing.css", &network),
            Err(CacheError::Fetch { .. })
        ));
    }

    #[test]
    fn test_install_fails_on_missing_asset() {
        let site_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let network = site(site_dir.path());
        let mut assets = assets();
        assets.push("./style.css".to_owned());
        let cache = AssetCache::new(cache_dir.path(), "v1", assets);

        assert!(matches!(
            cache.install(&network),
            Err(CacheError::Fetch { path, .. }) if path == "./style.css"
        ));
        assert!(!cache_dir.path().join("v1").exists());
    }

    #[test]
    fn test_activate_removes_other_versions() {
        let site_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let network = site(site_dir.path());

        let old = AssetCache::new(cache_dir.path(), "aim-schedule-v4.8", assets());
        old.install(&network).unwrap();
        let current = AssetCache::new(cache_dir.path(), "aim-schedule-v4.9", assets());
        current.install(&network).unwrap();

        assert_eq!(current.activate().unwrap(), vec!["aim-schedule-v4.8"]);
        assert!(current.activate().unwrap().is_empty());
        assert_eq!(
            current.fetch("./index.html", &network).unwrap().1,
            Origin::Cache
        );
        assert_eq!(old.fetch("./index.html", &network).unwrap().1, Origin::Network);
    }

    #[test]
    fn test_activate_without_root() {
        let cache_dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(cache_dir.path().join("missing"), "v1", assets());
        assert!(cache.activate().unwrap().is_empty());
    }
}
