use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Where a term's postings live in the finalized occurrence stream. Both
/// fields stay unset until the finalization pass has scanned the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLocation {
    pub term_id: u32,
    pub start_offset: Option<u64>,
    pub posting_count: Option<u64>,
}

impl TermLocation {
    pub fn new(term_id: u32) -> Self {
        TermLocation {
            term_id,
            start_offset: None,
            posting_count: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.start_offset.is_some() && self.posting_count.is_some()
    }
}

/// Bookkeeping shared by both storage variants: term ids handed out in
/// first-seen order (starting at 1, never reused) and the monotonically
/// growing set of document ids.
#[derive(Debug, Default)]
pub struct TermRegistry {
    ids: HashMap<String, u32>,
    terms: Vec<String>,
    documents: HashSet<u32>,
}

impl TermRegistry {
    pub fn new() -> Self {
        TermRegistry::default()
    }

    /// Returns the id for `term`, allocating the next sequential one on
    /// first sight. The flag is true when the term was new.
    pub fn intern(&mut self, term: &str) -> (u32, bool) {
        if let Some(&id) = self.ids.get(term) {
            (id, false)
        } else {
            let id = self.terms.len() as u32 + 1;
            self.ids.insert(term.to_string(), id);
            self.terms.push(term.to_string());
            (id, true)
        }
    }

    pub fn id_of(&self, term: &str) -> Option<u32> {
        self.ids.get(term).copied()
    }

    /// Known terms in first-seen order.
    pub fn vocabulary(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn record_document(&mut self, doc_id: u32) {
        self.documents.insert(doc_id);
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_in_first_seen_order() {
        let mut reg = TermRegistry::new();
        assert_eq!(reg.intern("cas"), (1, true));
        assert_eq!(reg.intern("ser"), (2, true));
        assert_eq!(reg.intern("cas"), (1, false));
        assert_eq!(reg.intern("verd"), (3, true));
        assert_eq!(reg.vocabulary(), &["cas", "ser", "verd"]);
    }

    #[test]
    fn ids_are_a_bijection_with_terms() {
        let mut reg = TermRegistry::new();
        let words = ["a", "b", "c", "b", "a", "d"];
        for w in words {
            reg.intern(w);
        }

        let mut seen = HashSet::new();
        for term in reg.vocabulary() {
            let id = reg.id_of(term).unwrap();
            assert!(seen.insert(id), "id {} assigned twice", id);
        }
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.id_of("missing"), None);
    }

    #[test]
    fn document_set_grows_monotonically() {
        let mut reg = TermRegistry::new();
        reg.record_document(111);
        reg.record_document(100_102);
        reg.record_document(111);
        assert_eq!(reg.document_count(), 2);
    }

    #[test]
    fn fresh_location_is_unfinalized() {
        let loc = TermLocation::new(5);
        assert_eq!(loc.term_id, 5);
        assert!(!loc.is_finalized());
    }
}
