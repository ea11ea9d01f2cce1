mod dictionary;
mod error;
mod indexer;
mod memory;
mod occurrence;
mod snapshot;
mod spill;
pub(crate) mod stats;

pub use self::dictionary::{TermLocation, TermRegistry};
pub use self::error::{IndexError, Result};
pub use self::indexer::Indexer;
pub use self::memory::MemoryIndex;
pub use self::occurrence::{read_record, TermOccurrence, RECORD_SIZE};
pub use self::snapshot::{write_snapshot, DICTIONARY_DATA_FILE, DICTIONARY_FST_FILE};
pub use self::spill::{SpillConfig, SpillIndex, STREAM_FILE};
pub use self::stats::{IndexStats, STATS_FILE};

/// Build phases of an index. The spill variant walks
/// `Building → Finalizing → Queryable` and never transitions back; the
/// in-memory variant only distinguishes building from finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Accepting occurrences; postings are not yet addressable.
    Building,
    /// A `finish` attempt has started and not yet succeeded.
    Finalizing,
    /// Finalized and read-only.
    Queryable,
}

/// Construction contract shared by the two storage variants.
///
/// The caller feeds one `index` call per distinct term per document (with
/// the frequency already aggregated for that document), then calls `finish`
/// once the corpus is exhausted. Postings lookups are only meaningful after
/// that.
pub trait Index {
    /// Registers that `term` occurred in `doc_id` with frequency
    /// `term_freq`. Allocates the next sequential term id on first sight of
    /// a term, and always records `doc_id` in the document set.
    fn index(&mut self, term: &str, doc_id: u32, term_freq: u32) -> Result<()>;

    /// Flushes buffered state and makes postings queryable. Calling it
    /// again after it has succeeded is a no-op.
    fn finish(&mut self) -> Result<()>;

    /// Known terms, in first-seen order. Stable within a run.
    fn vocabulary(&self) -> &[String];

    /// Number of distinct documents seen across the whole corpus.
    fn document_count(&self) -> usize;

    /// Number of distinct documents containing `term`; 0 for an unknown
    /// term, and on the spill variant 0 until finalization completes.
    fn document_count_with_term(&self, term: &str) -> usize;

    /// The full postings list for `term`. Empty for unknown terms, in any
    /// state, without error.
    fn occurrences(&self, term: &str) -> Result<Vec<TermOccurrence>>;
}
