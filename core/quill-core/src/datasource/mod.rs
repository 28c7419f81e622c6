//! Data sources — the scan contract consumed by `Scan` plans.
//!
//! A source exposes its schema and produces a lazy, finite stream of record
//! batches narrowed to the requested columns, in the requested order.

mod csv;
mod memory;
mod parquet;

pub use self::csv::CsvDataSource;
pub use self::memory::MemoryDataSource;
pub use self::parquet::ParquetDataSource;

use crate::error::QuillResult;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::collections::BTreeSet;
use std::fmt;

/// Lazy, single-pass sequence of record batches.
pub type BatchStream = Box<dyn Iterator<Item = QuillResult<RecordBatch>> + Send>;

/// A table the engine can scan.
pub trait DataSource: fmt::Debug + Send + Sync {
    /// Full schema of the source.
    fn schema(&self) -> SchemaRef;

    /// Stream batches holding only `projection` columns, in that order.
    /// An empty projection returns every column.
    fn scan(&self, projection: &[String]) -> QuillResult<BatchStream>;
}

/// Sources compare by identity: two scans are equal only if they read the
/// same registered source object.
impl PartialEq for dyn DataSource {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self, other)
    }
}

/// Split a requested column order into what file readers decode (distinct
/// indices in file order) and the positions that restore the request.
pub(crate) fn file_order(indices: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let distinct: BTreeSet<usize> = indices.iter().copied().collect();
    let reorder = indices
        .iter()
        .map(|i| distinct.range(..*i).count())
        .collect();
    (distinct.into_iter().collect(), reorder)
}

/// Drain a stream into a vector of batches.
pub fn collect(stream: BatchStream) -> QuillResult<Vec<RecordBatch>> {
    stream.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_order() {
        let (read, reorder) = file_order(&[3, 0, 2, 0]);
        assert_eq!(read, vec![0, 2, 3]);
        assert_eq!(reorder, vec![2, 0, 1, 0]);
    }
}
