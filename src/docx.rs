// DOCX equation discovery.
//
// Word stores embedded MathType objects as OLE compound files under
// word/embeddings/ inside the DOCX ZIP container. Entries are read straight
// from the archive; nothing is unpacked to disk.

use crate::error::Result;
use crate::mtef;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Archive prefix under which Word places embedded OLE objects.
pub const EMBEDDINGS_PREFIX: &str = "word/embeddings/";

/// Conversion result for one embedded object. Conversion failures are kept
/// per-entry so a single corrupt equation does not abort the document.
#[derive(Debug)]
pub struct EmbeddedEquation {
    /// Archive entry name, e.g. `word/embeddings/oleObject1.bin`
    pub name: String,
    pub latex: Result<String>,
}

/// Convert every embedded equation in a DOCX archive.
///
/// Entries are processed in name order so output is deterministic.
pub fn convert_embedded_equations<R: Read + Seek>(reader: R) -> Result<Vec<EmbeddedEquation>> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with(EMBEDDINGS_PREFIX) && !name.ends_with('/'))
        .map(String::from)
        .collect();
    names.sort();

    let mut results = Vec::with_capacity(names.len());
    for name in names {
        let mut entry = archive.by_name(&name)?;
        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents)?;

        let latex = mtef::decode_ole_object(Cursor::new(contents));
        results.push(EmbeddedEquation { name, latex });
    }

    Ok(results)
}

/// Convert every embedded equation in a DOCX file on disk.
pub fn convert_docx(path: &Path) -> Result<Vec<EmbeddedEquation>> {
    convert_embedded_equations(File::open(path)?)
}
