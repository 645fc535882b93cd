//! Batch orchestration: classify, extract every accepted file in parallel, keep input order.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::classify;
use crate::extract::extract_file;
use crate::record::ImageMetadataRecord;
use crate::source::FileHandle;
use crate::types::{Error, Result};

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ScanOptions {
    /// Number of worker threads; the global rayon pool is used when unset.
    pub jobs: Option<usize>,
    /// Files larger than this are not read and get an error record.
    pub max_file_bytes: Option<u64>,
}

pub struct Scanner {
    options: ScanOptions,
    pool: Option<ThreadPool>,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> std::result::Result<Scanner, ThreadPoolBuildError> {
        let pool = match options.jobs {
            Some(n) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("imscan-worker-{}", i))
                    .build()?,
            ),
            None => None,
        };
        Ok(Scanner { options, pool })
    }

    /// Extracts one record per file, in the order the files were given.
    pub fn scan<F: FileHandle>(&self, files: &[F]) -> Vec<ImageMetadataRecord> {
        let limit = self.options.max_file_bytes;
        let run = || -> Vec<ImageMetadataRecord> {
            files.par_iter().map(|f| extract_file(f, limit)).collect()
        };

        let records = match self.pool {
            Some(ref pool) => pool.install(run),
            None => run(),
        };
        info!(
            "scanned {} files, {} unreadable",
            records.len(),
            records.iter().filter(|r| r.is_error()).count()
        );
        records
    }

    /// Classifies the selection and scans the accepted files.
    ///
    /// Fails with `Error::EmptySelection`, before reading anything, if no file is accepted.
    pub fn scan_selection<F: FileHandle>(&self, files: Vec<F>) -> Result<Vec<ImageMetadataRecord>> {
        let accepted = classify::classify(files);
        if accepted.is_empty() {
            return Err(Error::EmptySelection);
        }
        Ok(self.scan(&accepted))
    }
}

impl Default for Scanner {
    fn default() -> Scanner {
        Scanner { options: ScanOptions::default(), pool: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryFile;

    #[test]
    fn test_empty_selection_is_rejected() {
        let files = vec![MemoryFile::new("notes.txt", b"hello".to_vec())];
        match Scanner::default().scan_selection(files) {
            Err(Error::EmptySelection) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_order_is_preserved_with_many_workers() {
        let files: Vec<_> = (0..64)
            .map(|i| MemoryFile::new(format!("f{:02}.png", i), vec![]))
            .collect();
        let scanner = Scanner::new(ScanOptions { jobs: Some(4), max_file_bytes: None }).unwrap();
        let records = scanner.scan(&files);
        assert_eq!(records.len(), 64);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.name, format!("f{:02}.png", i));
        }
    }
}
