//! Public API for writing and opening packages
//!
//! Thin entry points over [`PackageAssembler`] and [`PackageReader`].

use crate::error::{PackageError, PackageResult};
use crate::reader::PackageReader;
use crate::writer::PackageAssembler;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Write an assembled package to a file on disk
///
/// # Arguments
///
/// * `assembler` - The configured assembler; consumed by the write
/// * `path` - Path where the DOCX file will be saved
///
/// # Example
///
/// ```ignore
/// use docx_container::{write_docx, PackageAssembler};
///
/// let assembler = PackageAssembler::new();
/// write_docx(assembler, "output.docx")?;
/// ```
pub fn write_docx(assembler: PackageAssembler, path: impl AsRef<Path>) -> PackageResult<()> {
    let path = path.as_ref();

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = assembler.write(BufWriter::new(file))?;
    writer.flush()?;

    tracing::info!("Saved package to {}", path.display());
    Ok(())
}

/// Write an assembled package to an in-memory byte vector
///
/// # Example
///
/// ```ignore
/// use docx_container::{write_docx_bytes, PackageAssembler};
///
/// let bytes = write_docx_bytes(PackageAssembler::new())?;
/// std::fs::write("output.docx", bytes)?;
/// ```
pub fn write_docx_bytes(assembler: PackageAssembler) -> PackageResult<Vec<u8>> {
    let cursor = assembler.write(Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Open a package on disk for inspection
pub fn open_docx(path: impl AsRef<Path>) -> PackageResult<PackageReader<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PackageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ))
        } else {
            PackageError::Io(e)
        }
    })?;

    PackageReader::new(BufReader::new(file))
}

/// Open an in-memory package for inspection
pub fn open_docx_bytes(bytes: &[u8]) -> PackageResult<PackageReader<Cursor<&[u8]>>> {
    PackageReader::new(Cursor::new(bytes))
}
