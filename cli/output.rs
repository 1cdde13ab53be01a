use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use assetpack_core::Manifest;

#[derive(Debug, Serialize)]
pub struct ListedFile {
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct ManifestListing {
    pub files: Vec<ListedFile>,
    pub total_files: usize,
    pub total_bytes: u64,
}

impl ManifestListing {
    pub fn from_manifest(manifest: &Manifest, work_dir: &Path) -> Self {
        let files = manifest
            .files()
            .iter()
            .map(|f| ListedFile {
                path: display_path(&f.path, work_dir),
                size: f.size,
            })
            .collect();
        Self {
            files,
            total_files: manifest.len(),
            total_bytes: manifest.total_bytes(),
        }
    }
}

/// Absolute paths under `work_dir` are shown relative to it.
pub fn display_path(path: &Path, work_dir: &Path) -> String {
    if path.is_absolute() && path.starts_with(work_dir) {
        if let Some(rel) = pathdiff::diff_paths(path, work_dir) {
            return rel.to_string_lossy().into_owned();
        }
    }
    path.to_string_lossy().into_owned()
}

pub fn format_bytes(bytes: u64) -> String {
    format!(
        "{:.2}",
        Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary)
    )
}

pub fn print_listing_json(listing: &ManifestListing) -> Result<()> {
    let content =
        serde_json::to_string_pretty(listing).context("Failed to serialize file list to JSON")?;
    write_to_stdout(&content)
}

pub fn print_listing_table(listing: &ManifestListing) {
    if listing.files.is_empty() {
        println!("{}", "(No files selected)".yellow());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Green),
        Cell::new("Path").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
    ]);
    for (i, file) in listing.files.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Right),
            Cell::new(&file.path).fg(Color::Cyan),
            Cell::new(format_bytes(file.size))
                .set_alignment(CellAlignment::Right)
                .fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
    println!(
        "{:<14} {}",
        "Total Files:".green(),
        listing.total_files.to_string().cyan()
    );
    println!(
        "{:<14} {}",
        "Total Size:".green(),
        format_bytes(listing.total_bytes).cyan()
    );
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
