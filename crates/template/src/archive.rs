//! Zip packaging of generated documents

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::{Result, TemplateError};

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedOutput {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Bundle outputs into a single deflated zip, entries in the given order
pub fn package_archive(outputs: &[NamedOutput]) -> Result<Vec<u8>> {
    let cursor = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(cursor);

    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for output in outputs {
        zip.start_file(output.name.as_str(), options)
            .map_err(archive_error)?;
        zip.write_all(&output.bytes).map_err(archive_error)?;
    }

    let cursor = zip.finish().map_err(archive_error)?;
    let archive = cursor.into_inner();
    debug!(entries = outputs.len(), size = archive.len(), "archive packaged");
    Ok(archive)
}

fn archive_error(err: impl std::fmt::Display) -> TemplateError {
    TemplateError::ArchiveError(err.to_string())
}
