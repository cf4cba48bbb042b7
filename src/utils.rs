use crate::models::{ListingRecord, CSV_HEADER};
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn create_directories(dirs: &[&Path]) -> Result<()> {
    for dir in dirs {
        fs::create_dir_all(dir)
            .context(format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Reads one brand per line, trimmed, skipping blank lines.
pub fn read_brands_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read brand list: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn brand_output_path(output_dir: &Path, brand: &str) -> PathBuf {
    let file_stem = brand.replace(['/', '\\'], "_");
    output_dir.join(format!("otomoto_{}.csv", file_stem))
}

/// Appends records to `output_path`, writing the header only when the file is
/// created by this call. An empty batch leaves the file untouched.
pub fn append_listings_to_csv(records: &[ListingRecord], output_path: &Path) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let file_exists = output_path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_path)
        .context(format!("Failed to open output file: {}", output_path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if !file_exists {
        writer.write_record(CSV_HEADER)?;
    }

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    debug!(count = records.len(), path = %output_path.display(), "saved listings");

    Ok(())
}
