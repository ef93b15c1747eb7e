//! The dataset seam between the engines and whoever fetches records.
//!
//! Engines never fetch data themselves. They read an immutable snapshot through
//! [`DatasetSnapshot`]; the snapshot's generation id keys every memoised result, so a
//! refreshed dataset can never be answered from results of an older one.

use coin_stats::Record;

/// An immutable, enriched set of records.
///
/// # Example: exposing an existing store
///
/// ```rust
/// use coin_stats::Record;
/// use coin_stats_engine::DatasetSnapshot;
///
/// struct QueryResults {
///     rows: Vec<Record>,
///     version: u64,
/// }
///
/// impl DatasetSnapshot for QueryResults {
///     fn records(&self) -> &[Record] {
///         &self.rows
///     }
///
///     fn generation(&self) -> u64 {
///         self.version
///     }
/// }
/// ```
pub trait DatasetSnapshot: Send + Sync {
    /// Records in query order.
    fn records(&self) -> &[Record];

    /// Identifier of this snapshot; a refreshed dataset gets a new one.
    fn generation(&self) -> u64;

    /// Number of records.
    fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether the snapshot holds no records.
    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

/// Owned snapshot of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    generation: u64,
}

impl Dataset {
    /// Creates the first snapshot (generation 0).
    pub fn new(records: Vec<Record>) -> Self {
        Self::with_generation(records, 0)
    }

    /// Creates a snapshot with an explicit generation.
    pub fn with_generation(records: Vec<Record>, generation: u64) -> Self {
        Self {
            records,
            generation,
        }
    }

    /// Creates the snapshot that replaces this one.
    pub fn next(&self, records: Vec<Record>) -> Self {
        Self::with_generation(records, self.generation.wrapping_add(1))
    }
}

impl DatasetSnapshot for Dataset {
    fn records(&self) -> &[Record] {
        &self.records
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
