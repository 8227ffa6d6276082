use std::io::{Cursor, Read};

use zip::ZipArchive;

// An uploaded archive inflated into memory. The wasm sandbox has no
// filesystem, so the entry list plays the role of the temporary extraction
// directory: it lives for one request and is dropped on every exit path.
pub struct ExtractedArchive {
    // Entries in archive order, directories skipped
    entries: Vec<(String, Vec<u8>)>,
}

// The primary shapefile plus the companion attribute table, when present
pub struct ShapefileSet {
    pub shp_name: String,
    pub shp: Vec<u8>,
    pub dbf: Option<Vec<u8>>,
}

impl ExtractedArchive {
    // Inflate every file entry of a ZIP archive supplied as raw bytes
    pub fn from_zip_bytes(data: &[u8]) -> Result<Self, String> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| format!("Failed to open zip archive: {}", e))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| format!("Failed to read zip entry {}: {}", index, e))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)
                .map_err(|e| format!("Failed to inflate '{}': {}", name, e))?;
            entries.push((name, bytes));
        }

        Ok(ExtractedArchive { entries })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    // Locate the first .shp entry (any depth, case-insensitive) and pair it
    // with the .dbf companion sharing its path stem. None when the archive
    // holds no shapefile at all.
    pub fn find_shapefile(&self) -> Option<ShapefileSet> {
        let (shp_name, shp) = self
            .entries
            .iter()
            .find(|(name, _)| has_extension(name, "shp"))?;

        let stem = path_stem(shp_name);
        let dbf = self
            .entries
            .iter()
            .find(|(name, _)| has_extension(name, "dbf") && path_stem(name) == stem)
            .map(|(_, bytes)| bytes.clone());

        Some(ShapefileSet {
            shp_name: shp_name.clone(),
            shp: shp.clone(),
            dbf,
        })
    }
}

// Case-insensitive extension check on a zip entry path
fn has_extension(name: &str, extension: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case(extension),
        None => false,
    }
}

// Entry path without its extension, used to match companion files
fn path_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default();
        for (name, bytes) in entries {
            writer.start_file(name.to_string(), options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn finds_first_shapefile_with_companion() {
        let data = zip_with_entries(&[
            ("readme.txt", b"hello"),
            ("survey/parcels.shp", b"shp-bytes"),
            ("survey/parcels.dbf", b"dbf-bytes"),
            ("survey/other.shp", b"second"),
        ]);

        let archive = ExtractedArchive::from_zip_bytes(&data).unwrap();
        assert_eq!(archive.entry_count(), 4);

        let set = archive.find_shapefile().unwrap();
        assert_eq!(set.shp_name, "survey/parcels.shp");
        assert_eq!(set.shp, b"shp-bytes");
        assert_eq!(set.dbf.as_deref(), Some(b"dbf-bytes".as_slice()));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let data = zip_with_entries(&[("PARCELS.SHP", b"shp-bytes")]);

        let archive = ExtractedArchive::from_zip_bytes(&data).unwrap();
        let set = archive.find_shapefile().unwrap();
        assert_eq!(set.shp_name, "PARCELS.SHP");
        assert!(set.dbf.is_none());
    }

    #[test]
    fn archive_without_shapefile_yields_none() {
        let data = zip_with_entries(&[("notes.txt", b"no shapes here")]);

        let archive = ExtractedArchive::from_zip_bytes(&data).unwrap();
        assert!(archive.find_shapefile().is_none());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let result = ExtractedArchive::from_zip_bytes(b"definitely not a zip");
        assert!(result.is_err());
    }
}
