// Read side of a snapshot. The dictionary FST and its data file are
// memory-mapped; a term lookup walks the FST to the start of the term's
// location entry, reads the entry's length and then the entry itself, and
// finally slices the term's records straight out of the occurrence stream.

use crate::aux;
use crate::indexing::{
    IndexStats, TermLocation, TermOccurrence, DICTIONARY_DATA_FILE, DICTIONARY_FST_FILE,
    RECORD_SIZE, STREAM_FILE,
};
use anyhow::{Context, Result};
use fst::{Map, Streamer};
use memmap::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

pub struct Retriever {
    dictionary: Map<Mmap>,
    // Both may be legitimately absent: a corpus with no terms writes an
    // empty data file, and one that never spilled writes no stream at all.
    locations_data: Option<Mmap>,
    occurrences: Option<Mmap>,
    stats: IndexStats,
}

impl Retriever {
    /// Opens the snapshot stored in `index_directory`.
    pub fn open(index_directory: &Path) -> Result<Self> {
        let fst_path = index_directory.join(DICTIONARY_FST_FILE);
        let mmap = mmap_required(&fst_path)?;
        let dictionary =
            Map::new(mmap).with_context(|| format!("loading dictionary {}", fst_path.display()))?;

        let locations_data = mmap_optional(&index_directory.join(DICTIONARY_DATA_FILE))?;
        let occurrences = mmap_optional(&index_directory.join(STREAM_FILE))?;
        let stats = IndexStats::load_from(index_directory)?;

        Ok(Self {
            dictionary,
            locations_data,
            occurrences,
            stats,
        })
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn document_count(&self) -> usize {
        self.stats.documents
    }

    /// Known terms in lexicographic order, the order the FST stores them.
    pub fn vocabulary(&self) -> Vec<String> {
        let mut terms = Vec::new();
        let mut stream = self.dictionary.stream();
        while let Some((key, _)) = stream.next() {
            if let Ok(term) = String::from_utf8(key.to_vec()) {
                terms.push(term);
            }
        }
        terms
    }

    pub fn term_location(&self, term: &str) -> Result<Option<TermLocation>> {
        let start_pos = match aux::query_fst_u64(&self.dictionary, term) {
            Some(pos) => pos,
            None => return Ok(None),
        };
        let data = self
            .locations_data
            .as_ref()
            .context("dictionary data file is empty but the dictionary has entries")?;

        let entry_size: u64 = aux::read_value_from_mmap(data, start_pos, start_pos + 8)?;
        let location: TermLocation =
            aux::read_value_from_mmap(data, start_pos + 8, start_pos + 8 + entry_size)?;
        Ok(Some(location))
    }

    pub fn document_count_with_term(&self, term: &str) -> Result<usize> {
        Ok(self
            .term_location(term)?
            .and_then(|location| location.posting_count)
            .unwrap_or(0) as usize)
    }

    /// The full postings list for `term`, empty when the term is unknown.
    pub fn occurrences(&self, term: &str) -> Result<Vec<TermOccurrence>> {
        let location = match self.term_location(term)? {
            Some(location) => location,
            None => return Ok(Vec::new()),
        };
        let (start, count) = match (location.start_offset, location.posting_count) {
            (Some(start), Some(count)) => (start as usize, count as usize),
            _ => return Ok(Vec::new()),
        };

        let stream = self
            .occurrences
            .as_ref()
            .context("occurrence stream missing from the snapshot")?;
        let bytes = stream
            .get(start..start + count * RECORD_SIZE)
            .with_context(|| format!("postings for {:?} lie outside the occurrence stream", term))?;

        let mut postings = Vec::with_capacity(count);
        for chunk in bytes.chunks_exact(RECORD_SIZE) {
            let record: &[u8; RECORD_SIZE] = chunk.try_into()?;
            postings.push(TermOccurrence::from_bytes(record));
        }
        Ok(postings)
    }
}

fn mmap_required(path: &Path) -> Result<Mmap> {
    let file =
        File::open(path).with_context(|| format!("opening snapshot file {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

// Missing and zero-length files both read as `None`; mapping an empty file
// fails outright on most platforms.
fn mmap_optional(path: &Path) -> Result<Option<Mmap>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("opening snapshot file {}", path.display()))
        }
    };
    if file.metadata()?.len() == 0 {
        return Ok(None);
    }
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Some(mmap))
}
