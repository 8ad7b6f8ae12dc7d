use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Result};

/// Joins a request-supplied file name onto `root`, refusing anything that
/// could escape the directory.
pub fn resolve_asset_path(root: &Path, requested: &str) -> Result<PathBuf> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        bail!("asset path cannot be empty");
    }
    let relative = Path::new(trimmed);
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!("asset path '{trimmed}' escapes the asset directory");
            }
        }
    }
    if resolved == root {
        bail!("asset path '{trimmed}' does not name a file");
    }
    Ok(resolved)
}
