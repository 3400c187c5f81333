use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;

use crate::config::BodyCatalog;

/// Lists every `.png` file under `root`, recursively, as paths relative to `root`.
pub fn list_png_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries =
            fs::read_dir(&dir).with_context(|| format!("unable to read {}", dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("unable to list {}", dir.display()))?;
            let path = entry.path();
            // symlinked directories are not followed
            let file_type = entry
                .file_type()
                .with_context(|| format!("unable to stat {}", path.display()))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if is_png(&path) {
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                found.push(relative);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Texture references from `catalog` with no matching file under `root`.
pub fn missing_textures<P: AsRef<Path>>(catalog: &BodyCatalog, root: P) -> Result<Vec<String>> {
    let available: HashSet<PathBuf> = list_png_files(root)?.into_iter().collect();
    let mut missing = Vec::new();
    for texture in catalog.texture_refs() {
        if !available.contains(Path::new(texture)) && !missing.iter().any(|m| m == texture) {
            warn!("missing texture: {texture}");
            missing.push(texture.to_string());
        }
    }
    Ok(missing)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}
