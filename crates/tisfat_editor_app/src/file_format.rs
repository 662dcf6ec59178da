// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project file format (`.tzp`).
//!
//! A file is a little-endian `u16` format version followed by the
//! bincode-encoded [`Project`]. Loaded projects are validated before they
//! are handed to the editor.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use tisfat_editor_timeline::{InvariantError, Project};

/// Project file extension
pub const PROJECT_EXTENSION: &str = "tzp";

/// Current project file version
pub const FILE_FORMAT_VERSION: u16 = 1;

/// Project file errors
#[derive(Debug, Error)]
pub enum FileFormatError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Version this build does not read
    #[error("Unsupported file version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version in the file
        found: u16,
        /// Version this build reads
        supported: u16,
    },

    /// Malformed project data
    #[error("Decode error: {0}")]
    Decode(#[from] bincode::Error),

    /// Project data breaks the model invariants
    #[error("Invalid project: {0}")]
    Invalid(#[from] InvariantError),
}

/// Write a project to a stream
pub fn write_to(project: &Project, writer: &mut impl Write) -> Result<(), FileFormatError> {
    writer.write_all(&FILE_FORMAT_VERSION.to_le_bytes())?;
    bincode::serialize_into(&mut *writer, project)?;
    writer.flush()?;
    Ok(())
}

/// Read a project from a stream
pub fn read_from(reader: &mut impl Read) -> Result<Project, FileFormatError> {
    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let version = u16::from_le_bytes(version);
    if version != FILE_FORMAT_VERSION {
        return Err(FileFormatError::UnsupportedVersion {
            found: version,
            supported: FILE_FORMAT_VERSION,
        });
    }

    let project: Project = bincode::deserialize_from(reader)?;
    project.validate()?;
    Ok(project)
}

/// Save a project to `path`
pub fn save(project: &Project, path: &Path) -> Result<(), FileFormatError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_to(project, &mut writer)?;
    tracing::info!("Saved project to {}", path.display());
    Ok(())
}

/// Load a project from `path`
pub fn load(path: &Path) -> Result<Project, FileFormatError> {
    let mut reader = BufReader::new(File::open(path)?);
    let project = read_from(&mut reader)?;
    tracing::info!(
        "Loaded project from {} ({} layers)",
        path.display(),
        project.layer_count()
    );
    Ok(project)
}
