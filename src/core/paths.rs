//! Site root resolution and file layout.

use crate::constants;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SitePaths {
    pub root: PathBuf,
    pub site_toml: PathBuf,
    pub site_lock: PathBuf,
}

impl SitePaths {
    /// Resolve from CLI arg, then `CLAWPRESS_ROOT`, then the default root.
    pub fn resolve(root_arg: Option<PathBuf>) -> Self {
        if let Some(root) = root_arg {
            return Self::from_root(root);
        }
        match env::var(constants::ROOT_ENV) {
            Ok(root) if !root.is_empty() => Self::from_root(PathBuf::from(root)),
            _ => Self::from_root(PathBuf::from(constants::DEFAULT_SITE_ROOT)),
        }
    }

    pub fn from_root(root: PathBuf) -> Self {
        let site_toml = root.join("site.toml");
        let site_lock = root.join("site.lock");
        Self {
            root,
            site_toml,
            site_lock,
        }
    }
}

impl std::fmt::Display for SitePaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "site@{}", self.root.display())
    }
}
