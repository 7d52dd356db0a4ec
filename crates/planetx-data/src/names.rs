//! Loading the newline-delimited body-name list.

use crate::loader::DataLoadError;
use planetx_core::names::NamePool;
use std::path::Path;

/// The name list shipped with this crate.
pub const BUNDLED_NAMES: &str = include_str!("../data/planets.txt");

/// Parse the bundled name list.
pub fn bundled_names() -> NamePool {
    NamePool::from_lines(BUNDLED_NAMES)
}

/// Read a name list from disk.
///
/// Bytes that are not valid UTF-8 are replaced and then stripped along with
/// other control characters. A file with no usable names is an error.
pub fn load_name_pool(path: &Path) -> Result<NamePool, DataLoadError> {
    let bytes = std::fs::read(path)?;
    let pool = NamePool::from_lines(&String::from_utf8_lossy(&bytes));
    if pool.is_empty() {
        return Err(DataLoadError::EmptyNames {
            file: path.to_path_buf(),
        });
    }
    tracing::debug!(file = %path.display(), names = pool.len(), "name list loaded");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "planetx_names_{name}_{}.txt",
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn bundled_list_is_large_and_clean() {
        let pool = bundled_names();
        // Enough to name a maximum-size world.
        assert!(pool.len() >= 748, "only {} bundled names", pool.len());
        assert!(pool.names().iter().all(|n| !n.starts_with('\u{FEFF}')));
        assert!(pool.names().iter().all(|n| n.trim() == n && !n.is_empty()));
    }

    #[test]
    fn load_strips_garbage_bytes() {
        let path = temp_file("garbage", b"\xEF\xBB\xBFAlpha\r\nBe\x00ta\n\xFF\xFEGamma\n\n");
        let pool = load_name_pool(&path).unwrap();
        assert_eq!(pool.names(), &["Alpha", "Beta", "Gamma"]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn empty_list_is_an_error() {
        let path = temp_file("empty", b"\n \n\x00\n");
        assert!(matches!(
            load_name_pool(&path),
            Err(DataLoadError::EmptyNames { .. })
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_name_pool(Path::new("/no/such/planets.txt")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }
}
