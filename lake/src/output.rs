use std::fs;
use std::path::Path;

use common::Result;

/// Clears and recreates one relation's output directory. Overwrite is
/// all-or-nothing per relation; relations written before a later failure
/// stay on disk.
pub fn prepare_output_dir(output_root: &str, relation: &str) -> Result<String> {
    let dir = Path::new(output_root).join(relation);
    match fs::remove_dir_all(&dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(&dir)?;
    Ok(dir.to_string_lossy().into_owned())
}

/// Joins the input root (local directory or object-store URL) with a
/// relative glob pattern.
pub fn data_glob(input_root: &str, pattern: &str) -> String {
    format!("{}/{}", input_root.trim_end_matches('/'), pattern)
}
