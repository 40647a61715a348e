//! In-memory zip assembly.
//!
//! Entries are stored uncompressed (PNG and JPEG are already compressed) with
//! the zip crate's fixed default timestamp, so the same pages always produce
//! byte-identical archives.

use crate::config::PageRange;
use crate::error::ConvertError;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// `{source}_pages_{start}_to_{end}.zip`.
pub fn archive_file_name(source_name: &str, range: PageRange) -> String {
    format!("{}_pages_{}_to_{}.zip", source_name, range.start, range.end)
}

/// Zip writer over a growable buffer.
pub struct ArchiveBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
        }
    }

    /// Append a named entry. Names must be unique within the archive.
    pub fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ConvertError> {
        if !self.names.insert(name.to_string()) {
            return Err(ConvertError::ArchiveFailed(format!(
                "duplicate entry '{name}'"
            )));
        }
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        self.zip.start_file(name, options)?;
        self.zip
            .write_all(bytes)
            .map_err(|e| ConvertError::ArchiveFailed(format!("write '{name}': {e}")))?;
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.names.len()
    }

    /// Write the central directory and return the archive bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, ConvertError> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn archive_name_format() {
        assert_eq!(
            archive_file_name("report.pdf", PageRange::new(3, 5)),
            "report.pdf_pages_3_to_5.zip"
        );
    }

    #[test]
    fn entries_round_trip_in_order() {
        let mut b = ArchiveBuilder::new();
        b.add_entry("page_2.png", b"two").unwrap();
        b.add_entry("page_3.png", b"three").unwrap();
        assert_eq!(b.entry_count(), 2);
        let bytes = b.finish().unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 2);
        let mut first = zip.by_index(0).unwrap();
        assert_eq!(first.name(), "page_2.png");
        let mut content = Vec::new();
        first.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"two");
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let mut b = ArchiveBuilder::new();
        b.add_entry("page_1.png", b"a").unwrap();
        assert!(matches!(
            b.add_entry("page_1.png", b"b"),
            Err(ConvertError::ArchiveFailed(_))
        ));
    }

    #[test]
    fn output_is_deterministic() {
        let build = || {
            let mut b = ArchiveBuilder::new();
            b.add_entry("page_1.jpeg", &[1, 2, 3]).unwrap();
            b.add_entry("page_2.jpeg", &[4, 5, 6]).unwrap();
            b.finish().unwrap()
        };
        assert_eq!(build(), build());
    }
}
