//! Load and atomically persist site.toml.

use crate::constants;
use crate::models::site_config::SiteFile;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub fn load(path: &Path) -> Result<SiteFile> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read site file {}", path.display()))?;
    let mut site: SiteFile =
        toml::from_str(&content).with_context(|| format!("parse site file {}", path.display()))?;
    if site.site.version == 0 {
        site.site.version = 1;
    }
    site.plugin
        .validate()
        .with_context(|| format!("invalid [plugin] in {}", path.display()))?;
    Ok(site)
}

pub fn save(path: &Path, site: &SiteFile) -> Result<()> {
    let content = toml::to_string_pretty(site).context("serialize site file")?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent).context("create temp site file")?;
    tmp.write_all(content.as_bytes())
        .context("write site file")?;
    tmp.flush().context("flush site file")?;

    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(constants::SITE_TOML_MODE);
        tmp.as_file()
            .set_permissions(perm)
            .context("set permissions on temp site file")?;
    }

    tmp.persist(path)
        .map_err(|err| anyhow::anyhow!("persist site file: {}", err))?;
    Ok(())
}

pub fn ensure_root(root: &Path) -> Result<()> {
    fs::create_dir_all(root).with_context(|| format!("create directory {}", root.display()))?;
    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(constants::SITE_DIR_MODE);
        fs::set_permissions(root, perm)
            .with_context(|| format!("set permissions on {}", root.display()))?;
    }
    Ok(())
}
