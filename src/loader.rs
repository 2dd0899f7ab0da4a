//! This module reads and writes configuration files, delegating the text format to
//! [`crate::parser`] and [`crate::encoder`].

use crate::definition::{MachineDefinition, Settings};
use crate::encoder::to_text;
use crate::parser::parse_document;
use crate::types::{Metadata, TuringMachineError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension of configuration files discovered by [`load_dir`].
pub const CONFIG_EXTENSION: &str = "tm";

/// Loads a machine definition and its metadata from `path`.
///
/// # Arguments
///
/// * `path` - The configuration file to read.
/// * `settings` - Blank symbol, padding and default direction for the new definition.
///
/// # Returns
///
/// * `Ok((MachineDefinition, Option<Metadata>))` if the file is read and parsed.
/// * `Err(TuringMachineError::FileError)` if the file cannot be read.
/// * `Err(TuringMachineError::Parse)` if the content is not a valid configuration.
pub fn load(
    path: &Path,
    settings: Settings,
) -> Result<(MachineDefinition, Option<Metadata>), TuringMachineError> {
    let content = fs::read_to_string(path).map_err(|e| {
        TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), bytes = content.len(), "Loading configuration");

    Ok(parse_document(&content, settings)?)
}

/// Writes `def` to `path`, replacing any existing file.
pub fn save(
    path: &Path,
    def: &MachineDefinition,
    metadata: Option<&Metadata>,
) -> Result<(), TuringMachineError> {
    fs::write(path, to_text(def, metadata)).map_err(|e| {
        TuringMachineError::FileError(format!("Failed to write file {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), "Saved configuration");

    Ok(())
}

/// Loads every configuration file (`.tm` extension) in `directory`.
///
/// Subdirectories and files with other extensions are skipped.
///
/// # Returns
///
/// * `Vec<(PathBuf, Result<MachineDefinition, TuringMachineError>)>` - One entry per
///   candidate file, sorted by path, holding either the loaded definition or the reason it
///   failed. Errors reading the directory itself are reported against `directory`.
pub fn load_dir(
    directory: &Path,
    settings: Settings,
) -> Vec<(PathBuf, Result<MachineDefinition, TuringMachineError>)> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            return vec![(
                directory.to_path_buf(),
                Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                ))),
            )]
        }
    };

    let mut results: Vec<_> = entries
        .filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    return Some((
                        directory.to_path_buf(),
                        Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))),
                    ))
                }
            };

            let path = entry.path();

            if path.is_dir() || path.extension().is_none_or(|ext| ext != CONFIG_EXTENSION) {
                return None;
            }

            let result = load(&path, settings).map(|(def, _)| def);
            Some((path, result))
        })
        .collect();

    // Directory order is unspecified.
    results.sort_by(|(a, _), (b, _)| a.cmp(b));
    results
}
