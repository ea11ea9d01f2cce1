use crate::indexing::dictionary::TermRegistry;
use crate::indexing::error::{IndexError, Result};
use crate::indexing::occurrence::TermOccurrence;
use crate::indexing::{Index, IndexState};
use std::collections::HashSet;

/// Storage variant that keeps every postings list fully resident. Bounded
/// only by available memory, which makes it the correctness baseline the
/// spill variant is checked against.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    registry: TermRegistry,
    // Postings per term, indexed by term_id - 1.
    postings: Vec<Vec<TermOccurrence>>,
    finished: bool,
}

impl MemoryIndex {
    pub fn new() -> Self {
        MemoryIndex::default()
    }
}

impl Index for MemoryIndex {
    fn index(&mut self, term: &str, doc_id: u32, term_freq: u32) -> Result<()> {
        if self.finished {
            return Err(IndexError::InvalidState {
                op: "index",
                state: IndexState::Queryable,
            });
        }

        self.registry.record_document(doc_id);
        let (term_id, new_term) = self.registry.intern(term);
        if new_term {
            self.postings.push(Vec::new());
        }
        self.postings[(term_id - 1) as usize].push(TermOccurrence::new(doc_id, term_id, term_freq));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn vocabulary(&self) -> &[String] {
        self.registry.vocabulary()
    }

    fn document_count(&self) -> usize {
        self.registry.document_count()
    }

    fn document_count_with_term(&self, term: &str) -> usize {
        match self.registry.id_of(term) {
            Some(id) => {
                let docs: HashSet<u32> = self.postings[(id - 1) as usize]
                    .iter()
                    .map(|occ| occ.doc_id)
                    .collect();
                docs.len()
            }
            None => 0,
        }
    }

    fn occurrences(&self, term: &str) -> Result<Vec<TermOccurrence>> {
        Ok(match self.registry.id_of(term) {
            Some(id) => self.postings[(id - 1) as usize].clone(),
            None => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_and_returns_postings() {
        let mut index = MemoryIndex::new();
        index.index("cas", 111, 2).unwrap();
        index.index("cas", 100_102, 2).unwrap();
        index.index("ser", 111, 1).unwrap();
        index.finish().unwrap();

        assert_eq!(index.vocabulary(), &["cas", "ser"]);
        assert_eq!(index.document_count(), 2);
        assert_eq!(index.document_count_with_term("cas"), 2);
        assert_eq!(index.document_count_with_term("ser"), 1);

        let postings = index.occurrences("cas").unwrap();
        assert_eq!(
            postings,
            vec![
                TermOccurrence::new(111, 1, 2),
                TermOccurrence::new(100_102, 1, 2),
            ]
        );
    }

    #[test]
    fn unknown_term_is_empty_before_and_after_finish() {
        let mut index = MemoryIndex::new();
        index.index("cas", 1, 1).unwrap();
        assert!(index.occurrences("unknown_term").unwrap().is_empty());
        index.finish().unwrap();
        assert!(index.occurrences("unknown_term").unwrap().is_empty());
        assert_eq!(index.document_count_with_term("unknown_term"), 0);
    }

    #[test]
    fn finish_is_idempotent_and_freezes_the_index() {
        let mut index = MemoryIndex::new();
        index.index("cas", 1, 1).unwrap();
        index.finish().unwrap();
        index.finish().unwrap();

        match index.index("ser", 2, 1) {
            Err(IndexError::InvalidState { op: "index", .. }) => {}
            other => panic!("expected InvalidState, got {:?}", other),
        }
        assert_eq!(index.vocabulary(), &["cas"]);
    }
}
