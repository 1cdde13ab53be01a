use crate::config::is_identifier;
use crate::error::{AppError, Result};
use log;
use std::fs;
use std::path::Path;

pub const GENERATED_HEADER: &str = "// Code generated by assetpack. DO NOT EDIT.";
pub const RUNTIME_IMPORT: &str = "use assetpack_core::Bundle;";

/// Renders the generated source for one bundle. The output depends only on
/// the arguments.
pub fn render(blob: &[u8], variable: &str, decompress: bool, package: &str) -> String {
    let mut literal = String::with_capacity(blob.len() * 2);
    for &byte in blob {
        literal.extend(std::ascii::escape_default(byte).map(char::from));
    }
    format!(
        concat!(
            "{header}\n// crate: {package}\n\n{import}\n\n",
            "pub static {variable}: Bundle = Bundle::new({decompress}, b\"{literal}\");\n",
        ),
        header = GENERATED_HEADER,
        package = package,
        import = RUNTIME_IMPORT,
        variable = variable,
        decompress = decompress,
        literal = literal,
    )
}

pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Reads `[package].name` from `Cargo.toml` in `work_dir`, as a crate
/// identifier (dashes become underscores).
pub fn discover_package_name(work_dir: &Path) -> Result<String> {
    let manifest_path = work_dir.join("Cargo.toml");
    log::debug!("Reading package name from {}", manifest_path.display());
    let content = fs::read_to_string(&manifest_path).map_err(|e| {
        AppError::PackageDiscovery(format!(
            "cannot read {}: {}",
            manifest_path.display(),
            e
        ))
    })?;
    let table: toml::Table = toml::from_str(&content).map_err(|e| {
        AppError::PackageDiscovery(format!(
            "cannot parse {}: {}",
            manifest_path.display(),
            e
        ))
    })?;

    let name = table
        .get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .ok_or_else(|| {
            AppError::PackageDiscovery(format!(
                "no [package] name in {}",
                manifest_path.display()
            ))
        })?;

    let crate_name = name.replace('-', "_");
    if !is_identifier(&crate_name) {
        return Err(AppError::PackageDiscovery(format!(
            "package name '{}' is not a valid crate name",
            name
        )));
    }
    Ok(crate_name)
}
