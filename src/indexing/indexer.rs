use crate::indexing::stats::IndexStats;
use crate::indexing::{Index, Result};
use crate::tokenizer::Normalizer;
use std::time::Instant;

/// Drives a document iterator through normalization and into an index.
///
/// Works against either storage variant; the caller picks one and hands it
/// over, then gets it back through `index()` once the build is done.
pub struct Indexer<I: Index> {
    index: I,
    normalizer: Normalizer,
    started: Instant,
    occurrences: u64,
}

impl<I: Index> Indexer<I> {
    pub fn new(index: I, normalizer: Normalizer) -> Self {
        Self {
            index,
            normalizer,
            started: Instant::now(),
            occurrences: 0,
        }
    }

    /// Feeds every document the iterator yields into the index. `None`
    /// items are documents the reader already reported and skipped.
    ///
    /// Each distinct term of a document becomes one `index` call carrying
    /// the term's frequency within that document.
    pub fn index_documents(
        &mut self,
        iter: impl Iterator<Item = Option<(u32, String)>>,
    ) -> Result<usize> {
        let mut n_docs: usize = 0;

        for (doc_id, text) in iter.flatten() {
            n_docs += 1;

            for (term, term_freq) in self.normalizer.term_frequencies(&text) {
                self.index.index(&term, doc_id, term_freq)?;
                self.occurrences += 1;
            }
        }

        Ok(n_docs)
    }

    /// Finalizes the underlying index and reports the build summary.
    pub fn finish(&mut self) -> Result<IndexStats> {
        self.index.finish()?;

        Ok(IndexStats {
            documents: self.index.document_count(),
            terms: self.index.vocabulary().len(),
            occurrences: self.occurrences,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        })
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn into_index(self) -> I {
        self.index
    }
}
