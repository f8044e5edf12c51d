use std::io::{Cursor, Read};

use zip::result::ZipError;
use zip::ZipArchive;

/// A GTFS zip archive held fully in memory, as fetched from an agency url.
pub struct FeedArchive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
}

impl FeedArchive {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ZipError> {
        let zip = ZipArchive::new(Cursor::new(bytes))?;
        Ok(Self { zip })
    }

    /// Names of every entry in the archive, in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(str::to_string).collect()
    }

    /// Read a whole entry. Returns `Ok(None)` when the entry is absent.
    pub fn read_optional(&mut self, name: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(std::io::Error::other(err)),
        };
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(Some(data))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{Cursor, Write};

    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Build an in-memory GTFS zip from (entry name, contents) pairs.
    pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, FileOptions::default())
                .expect("start entry");
            writer.write_all(contents.as_bytes()).expect("write entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }
}
