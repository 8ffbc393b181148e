#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: memmap2::Mmap,
    path: std::path::PathBuf,
}

impl MmapFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf)?;

        // SAFETY:
        // - File is opened read-only
        // - We keep the file handle alive in struct
        // - Caller only gets immutable &[u8]
        let mmap = unsafe { memmap2::Mmap::map(&file)? };

        tracing::debug!(path = %path_buf.display(), bytes = mmap.len(), "mapped file");

        Ok(Self {
            _file: file,
            mmap,
            path: path_buf,
        })
    }

    /// Decodes the whole mapping as UTF-8 into characters.
    ///
    /// Invalid sequences become U+FFFD instead of failing the load.
    #[must_use]
    pub fn decode_chars(&self) -> Vec<char> {
        String::from_utf8_lossy(&self.mmap).chars().collect()
    }

    /// File length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Whether file is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of mapped file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Maps `path` and returns its decoded characters. The mapping is released
/// before returning.
///
/// # Errors
///
/// - `std::io::Error` if the file cannot be opened or mapped.
pub fn read_chars(path: impl AsRef<std::path::Path>) -> std::io::Result<Vec<char>> {
    Ok(MmapFile::open(path)?.decode_chars())
}

#[cfg(test)]
mod mmap_tests {
    use std::io::Write;

    fn temp_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(content).unwrap();
        temp.as_file().sync_all().unwrap();
        temp
    }

    #[test]
    fn decodes_multibyte_characters() {
        let temp = temp_with("héllo ✓\n".as_bytes());
        let chars = super::read_chars(temp.path()).unwrap();

        assert_eq!(chars.len(), 8);
        assert_eq!(chars[1], 'é');
        assert_eq!(chars[6], '✓');
    }

    #[test]
    fn invalid_utf8_becomes_replacement_character() {
        let temp = temp_with(&[b'a', 0xff, b'b']);
        let chars = super::read_chars(temp.path()).unwrap();

        assert_eq!(chars, vec!['a', char::REPLACEMENT_CHARACTER, 'b']);
    }

    #[test]
    fn empty_file_maps_to_nothing() {
        let temp = temp_with(b"");
        let mmap = super::MmapFile::open(temp.path()).unwrap();

        assert!(mmap.is_empty());
        assert!(mmap.decode_chars().is_empty());
        assert_eq!(mmap.path(), temp.path());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = super::read_chars(dir.path().join("absent.txt")).unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
