//! Output document persistence
//!
//! This module writes the rendered schedule to the filesystem; the file name
//! is derived from the program heading.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes rendered schedules under an output directory
pub struct ScheduleWriter {
    output_dir: PathBuf,
}

impl ScheduleWriter {
    /// Create a writer, creating the output directory if needed
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).context("Failed to create output directory")?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Save the rendered document, naming it from the heading's year
    ///
    /// # Returns
    ///
    /// Path to the saved file
    pub fn save(&self, heading: &str, html: &str) -> Result<PathBuf> {
        let filename = format!("conference_program_{}.html", year_token(heading));
        let filepath = self.output_dir.join(&filename);

        let mut file = File::create(&filepath)
            .with_context(|| format!("Failed to create file: {}", filepath.display()))?;
        file.write_all(html.as_bytes())
            .with_context(|| format!("Failed to write to file: {}", filepath.display()))?;

        tracing::info!(path = %filepath.display(), "Saved schedule document");
        Ok(filepath)
    }

    /// Get output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Leading 4-digit year of a heading like "2025 ACM-SIAM Symposium on
/// Discrete Algorithms", or "program" when the heading carries none
fn year_token(heading: &str) -> String {
    let prefix: String = heading.chars().take(4).collect();
    if prefix.len() == 4 && prefix.chars().all(|c| c.is_ascii_digit()) {
        prefix
    } else {
        "program".to_string()
    }
}
