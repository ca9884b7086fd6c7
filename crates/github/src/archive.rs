use std::{fs, io::Cursor};

use actions_logs_core::{models::RunArchive, util::join_normalized};
use anyhow::{Context, Result};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub files: usize,
    /// Entries whose names would escape the run directory.
    pub skipped: usize,
}

/// Write the raw archive as `logs.zip` in the run directory, then extract it
/// alongside. Existing files are overwritten.
pub fn save_archive(archive: &RunArchive) -> Result<ExtractStats> {
    fs::create_dir_all(&archive.dir)
        .with_context(|| format!("Failed to create {}", archive.dir.display()))?;
    let path = archive.archive_path();
    fs::write(&path, &archive.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    extract_archive(archive)
}

pub fn extract_archive(archive: &RunArchive) -> Result<ExtractStats> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes.clone()))
        .with_context(|| format!("Failed to open log archive for run {}", archive.run_id))?;
    let mut stats = ExtractStats::default();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let Some(path) = file.enclosed_name() else {
            tracing::warn!("Skipping entry '{}' in run {}", file.name(), archive.run_id);
            stats.skipped += 1;
            continue;
        };
        let out_path = join_normalized(&archive.dir, path);
        if file.is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("Failed to create {}", out_path.display()))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut out = fs::File::create(&out_path)
            .with_context(|| format!("Failed to create {}", out_path.display()))?;
        std::io::copy(&mut file, &mut out)
            .with_context(|| format!("Failed to extract {}", out_path.display()))?;
        stats.files += 1;
    }
    tracing::debug!(
        "Extracted {} files for run {} ({} skipped)",
        stats.files,
        archive.run_id,
        stats.skipped
    );
    Ok(stats)
}
