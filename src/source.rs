//! Files handed to the scanner: a name plus a way to read the whole contents.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub trait FileHandle: Sync {
    /// File name shown in the table; not necessarily unique within a batch.
    fn name(&self) -> &str;

    /// Reads the whole file. Files longer than `limit` bytes are refused.
    fn read_bytes(&self, limit: Option<u64>) -> io::Result<Vec<u8>>;
}

fn too_large(len: u64, limit: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("file size {} exceeds the limit of {} bytes", len, limit),
    )
}

/// A file on disk.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DiskFile {
    name: String,
    path: PathBuf,
}

impl DiskFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> DiskFile {
        let path = path.into();
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        DiskFile { name, path }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileHandle for DiskFile {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self, limit: Option<u64>) -> io::Result<Vec<u8>> {
        let file = File::open(&self.path)?;
        match limit {
            None => {
                let mut data = Vec::new();
                (&file).read_to_end(&mut data)?;
                Ok(data)
            }
            Some(limit) => {
                let len = file.metadata()?.len();
                if len > limit {
                    return Err(too_large(len, limit));
                }
                // the file may grow between the size check and the read
                let mut data = Vec::with_capacity(len as usize);
                file.take(limit + 1).read_to_end(&mut data)?;
                if data.len() as u64 > limit {
                    return Err(too_large(data.len() as u64, limit));
                }
                Ok(data)
            }
        }
    }
}

/// A file whose contents are already in memory.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MemoryFile {
    name: String,
    data: Vec<u8>,
}

impl MemoryFile {
    pub fn new<S: Into<String>>(name: S, data: Vec<u8>) -> MemoryFile {
        MemoryFile { name: name.into(), data }
    }
}

impl FileHandle for MemoryFile {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self, limit: Option<u64>) -> io::Result<Vec<u8>> {
        match limit {
            Some(limit) if self.data.len() as u64 > limit => Err(too_large(self.data.len() as u64, limit)),
            _ => Ok(self.data.clone()),
        }
    }
}

/// Expands the given paths into a list of files.
///
/// Directories are walked in file name order (recursively unless `recursive` is false);
/// other paths are taken as they are. Entries that cannot be read while walking are skipped.
pub fn collect_paths<P: AsRef<Path>>(paths: &[P], recursive: bool) -> io::Result<Vec<DiskFile>> {
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !fs::metadata(path)?.is_dir() {
            files.push(DiskFile::new(path));
            continue;
        }

        let walker = WalkDir::new(path)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        files.push(DiskFile::new(entry.into_path()));
                    }
                }
                Err(e) => warn!("skipping unreadable entry under {}: {}", path.display(), e),
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_file_limit() {
        let f = MemoryFile::new("a.png", vec![0; 10]);
        assert_eq!(f.read_bytes(None).unwrap().len(), 10);
        assert_eq!(f.read_bytes(Some(10)).unwrap().len(), 10);
        assert!(f.read_bytes(Some(9)).is_err());
    }

    #[test]
    fn test_disk_file_name() {
        let f = DiskFile::new("/some/folder/Scan.TIF");
        assert_eq!(f.name(), "Scan.TIF");
        assert_eq!(f.path(), Path::new("/some/folder/Scan.TIF"));
    }
}
