// Disk-backed index variant. Occurrences accumulate in a bounded in-memory
// buffer; when it fills, the buffer is sorted and merged with the on-disk
// stream into a scratch file that atomically replaces the stream. After the
// final merge a single sequential scan fills in each term's byte range, and
// queries then seek straight to their postings.

use crate::indexing::dictionary::{TermLocation, TermRegistry};
use crate::indexing::error::{IndexError, Result};
use crate::indexing::occurrence::{read_record, TermOccurrence, RECORD_SIZE};
use crate::indexing::{Index, IndexState};
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File holding the sorted occurrence stream inside the index directory.
pub const STREAM_FILE: &str = "occurrences.bin";
const STREAM_TMP_FILE: &str = "occurrences.bin.tmp";

const DEFAULT_BUFFER_CAPACITY: usize = 1_000_000;
const DEFAULT_MAX_STREAM_BYTES: u64 = 8 * 1024 * 1024 * 1024;

/// Tuning knobs for [`SpillIndex`].
#[derive(Debug, Clone)]
pub struct SpillConfig {
    /// Directory the occurrence stream and snapshot files live in.
    pub directory: PathBuf,
    /// Occurrences buffered in memory before a spill is forced.
    pub buffer_capacity: usize,
    /// Ceiling on the stream size, checked during finalization.
    pub max_stream_bytes: u64,
}

impl SpillConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        SpillConfig {
            directory: directory.into(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_stream_bytes: DEFAULT_MAX_STREAM_BYTES,
        }
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        // a zero-capacity buffer could never make progress
        self.buffer_capacity = capacity.max(1);
        self
    }

    pub fn with_max_stream_bytes(mut self, limit: u64) -> Self {
        self.max_stream_bytes = limit;
        self
    }
}

impl Default for SpillConfig {
    fn default() -> Self {
        SpillConfig::new(".")
    }
}

/// Index variant that bounds memory usage by spilling sorted occurrence
/// batches into a single on-disk stream.
///
/// The stream is only ever replaced wholesale: each spill merges the sorted
/// buffer with the existing stream into a scratch file and renames it over
/// the stream once complete, so an interrupted merge leaves the previous
/// stream intact and the buffered occurrences unconsumed.
pub struct SpillIndex {
    registry: TermRegistry,
    // One slot per term, indexed by term id minus one.
    locations: Vec<TermLocation>,
    buffer: Vec<TermOccurrence>,
    config: SpillConfig,
    state: IndexState,
    spills: u64,
}

impl SpillIndex {
    /// Creates a fresh index in `config.directory`, discarding any stream
    /// or scratch file left behind by an earlier build.
    pub fn new(config: SpillConfig) -> Result<Self> {
        fs::create_dir_all(&config.directory)?;
        for name in [STREAM_FILE, STREAM_TMP_FILE] {
            let stale = config.directory.join(name);
            if stale.exists() {
                fs::remove_file(&stale)?;
            }
        }

        Ok(SpillIndex {
            registry: TermRegistry::new(),
            locations: Vec::new(),
            buffer: Vec::new(),
            config,
            state: IndexState::Building,
            spills: 0,
        })
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    /// Number of buffer spills performed so far, counting the final one.
    pub fn spill_count(&self) -> u64 {
        self.spills
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    pub fn stream_path(&self) -> PathBuf {
        self.config.directory.join(STREAM_FILE)
    }

    fn tmp_path(&self) -> PathBuf {
        self.config.directory.join(STREAM_TMP_FILE)
    }

    /// Terms paired with their locations, in term id order. Locations carry
    /// offsets only once the index is queryable.
    pub fn term_locations(&self) -> impl Iterator<Item = (&str, &TermLocation)> {
        self.registry
            .vocabulary()
            .iter()
            .map(|term| term.as_str())
            .zip(self.locations.iter())
    }

    /// Sorts the buffer and merges it into the stream. The merged output is
    /// written to a scratch file that replaces the stream only after the
    /// merge has fully succeeded; on failure the previous stream and the
    /// buffer both survive for a retry.
    fn spill(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.buffer.sort_unstable();

        let stream_path = self.stream_path();
        let tmp_path = self.tmp_path();
        let merged = self
            .merge_into(&stream_path, &tmp_path)
            .and_then(|_| fs::rename(&tmp_path, &stream_path).map_err(IndexError::from));
        if let Err(e) = merged {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        self.spills += 1;
        debug!(
            "spill {}: merged {} buffered occurrences into {}",
            self.spills,
            self.buffer.len(),
            stream_path.display()
        );
        self.buffer.clear();
        Ok(())
    }

    // Two-pointer merge of the sorted buffer with the sorted stream. Stream
    // records win ties so earlier spills stay ahead of later ones.
    fn merge_into(&self, stream_path: &Path, tmp_path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(tmp_path)?);
        let mut stream = StreamReader::open(stream_path)?;

        let mut from_stream = stream.next()?;
        let mut buffered = self.buffer.iter();
        let mut from_buffer = buffered.next();

        loop {
            match (from_stream, from_buffer) {
                (Some(s), Some(b)) if s <= *b => {
                    s.write_to(&mut out)?;
                    from_stream = stream.next()?;
                }
                (_, Some(b)) => {
                    b.write_to(&mut out)?;
                    from_buffer = buffered.next();
                }
                (Some(s), None) => {
                    s.write_to(&mut out)?;
                    from_stream = stream.next()?;
                }
                (None, None) => break,
            }
        }

        out.flush()?;
        Ok(())
    }

    /// One sequential pass over the sorted stream, filling in each term's
    /// start offset and posting count. The scan never writes, so a failed
    /// finalization can always be retried.
    fn finalize_locations(&mut self) -> Result<()> {
        let stream_path = self.stream_path();
        let stream_len = match fs::metadata(&stream_path) {
            Ok(meta) => meta.len(),
            // Nothing was ever spilled; an empty corpus stays that way.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if stream_len > self.config.max_stream_bytes {
            return Err(IndexError::ResourceExhausted {
                size: stream_len,
                limit: self.config.max_stream_bytes,
            });
        }

        let mut stream = StreamReader::open(&stream_path)?;
        let mut offset = 0u64;
        // Current run of records sharing a term id: (term id, start, count).
        let mut run: Option<(u32, u64, u64)> = None;

        while let Some(occ) = stream.next()? {
            run = match run {
                Some((term_id, start, count)) if term_id == occ.term_id => {
                    Some((term_id, start, count + 1))
                }
                prev => {
                    if let Some(done) = prev {
                        self.commit_run(done)?;
                    }
                    Some((occ.term_id, offset, 1))
                }
            };
            offset += RECORD_SIZE as u64;
        }
        if let Some(done) = run {
            self.commit_run(done)?;
        }
        Ok(())
    }

    fn commit_run(&mut self, (term_id, start, count): (u32, u64, u64)) -> Result<()> {
        let slot = term_id
            .checked_sub(1)
            .and_then(|i| self.locations.get_mut(i as usize))
            .ok_or(IndexError::MalformedRecord {
                offset: start,
                detail: format!("record references unallocated term id {}", term_id),
            })?;
        slot.start_offset = Some(start);
        slot.posting_count = Some(count);
        Ok(())
    }

    fn read_postings(&self, start: u64, count: u64) -> Result<Vec<TermOccurrence>> {
        let mut file = File::open(self.stream_path())?;
        file.seek(SeekFrom::Start(start))?;
        let mut rdr = BufReader::new(file);

        let mut postings = Vec::with_capacity(count as usize);
        let mut offset = start;
        for _ in 0..count {
            match read_record(&mut rdr, offset)? {
                Some(occ) => {
                    postings.push(occ);
                    offset += RECORD_SIZE as u64;
                }
                None => {
                    return Err(IndexError::MalformedRecord {
                        offset,
                        detail: "stream ended before the recorded posting count".to_string(),
                    })
                }
            }
        }
        Ok(postings)
    }
}

impl Index for SpillIndex {
    fn index(&mut self, term: &str, doc_id: u32, term_freq: u32) -> Result<()> {
        if self.state != IndexState::Building {
            return Err(IndexError::InvalidState {
                op: "index",
                state: self.state,
            });
        }

        self.registry.record_document(doc_id);
        let (term_id, new_term) = self.registry.intern(term);
        if new_term {
            self.locations.push(TermLocation::new(term_id));
        }
        self.buffer.push(TermOccurrence::new(doc_id, term_id, term_freq));

        if self.buffer.len() >= self.config.buffer_capacity {
            self.spill()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.state == IndexState::Queryable {
            return Ok(());
        }

        self.state = IndexState::Finalizing;
        self.spill()?;
        self.finalize_locations()?;
        self.state = IndexState::Queryable;
        debug!(
            "index finalized: {} terms over {} documents, {} spills",
            self.registry.len(),
            self.registry.document_count(),
            self.spills
        );
        Ok(())
    }

    fn vocabulary(&self) -> &[String] {
        self.registry.vocabulary()
    }

    fn document_count(&self) -> usize {
        self.registry.document_count()
    }

    fn document_count_with_term(&self, term: &str) -> usize {
        if self.state != IndexState::Queryable {
            return 0;
        }
        self.registry
            .id_of(term)
            .and_then(|id| self.locations[(id - 1) as usize].posting_count)
            .unwrap_or(0) as usize
    }

    fn occurrences(&self, term: &str) -> Result<Vec<TermOccurrence>> {
        match self.state {
            // Offsets are not known yet, so no postings are visible.
            IndexState::Building => Ok(Vec::new()),
            IndexState::Finalizing => Err(IndexError::InvalidState {
                op: "occurrences",
                state: self.state,
            }),
            IndexState::Queryable => {
                let location = match self.registry.id_of(term) {
                    Some(id) => &self.locations[(id - 1) as usize],
                    None => return Ok(Vec::new()),
                };
                match (location.start_offset, location.posting_count) {
                    (Some(start), Some(count)) => self.read_postings(start, count),
                    _ => Ok(Vec::new()),
                }
            }
        }
    }
}

// Sequential reader over the occurrence stream that tracks its byte offset
// for error reporting. A missing file reads as an empty stream.
struct StreamReader {
    rdr: Option<BufReader<File>>,
    offset: u64,
}

impl StreamReader {
    fn open(path: &Path) -> Result<Self> {
        let rdr = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(StreamReader { rdr, offset: 0 })
    }

    fn next(&mut self) -> Result<Option<TermOccurrence>> {
        match self.rdr.as_mut() {
            None => Ok(None),
            Some(rdr) => {
                let rec = read_record(rdr, self.offset)?;
                if rec.is_some() {
                    self.offset += RECORD_SIZE as u64;
                }
                Ok(rec)
            }
        }
    }
}
