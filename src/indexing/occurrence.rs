// One occurrence ties a term (by id) to a document and the term's frequency
// within it. Records are stored on disk as three big-endian u32 fields in
// doc_id, term_id, term_freq order, 12 bytes per record.

use crate::indexing::error::{IndexError, Result};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Read, Write};

/// Encoded size of one occurrence record.
pub const RECORD_SIZE: usize = 12;

/// A single `(doc_id, term_id, term_freq)` posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TermOccurrence {
    pub doc_id: u32,
    pub term_id: u32,
    pub term_freq: u32,
}

impl TermOccurrence {
    pub fn new(doc_id: u32, term_id: u32, term_freq: u32) -> Self {
        TermOccurrence {
            doc_id,
            term_id,
            term_freq,
        }
    }

    pub fn write_to<W: Write>(&self, wtr: &mut W) -> io::Result<()> {
        wtr.write_u32::<BigEndian>(self.doc_id)?;
        wtr.write_u32::<BigEndian>(self.term_id)?;
        wtr.write_u32::<BigEndian>(self.term_freq)
    }

    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        TermOccurrence {
            doc_id: BigEndian::read_u32(&buf[0..4]),
            term_id: BigEndian::read_u32(&buf[4..8]),
            term_freq: BigEndian::read_u32(&buf[8..12]),
        }
    }
}

// Sorted primarily by term id, then by document id. The frequency acts as a
// last tiebreak so the ordering stays consistent with field-wise equality.
impl Ord for TermOccurrence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.term_id
            .cmp(&other.term_id)
            .then(self.doc_id.cmp(&other.doc_id))
            .then(self.term_freq.cmp(&other.term_freq))
    }
}

impl PartialOrd for TermOccurrence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TermOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(term_id: {} doc: {} freq: {})",
            self.term_id, self.doc_id, self.term_freq
        )
    }
}

/// Reads the next record from `rdr`, where `offset` is the byte position the
/// record starts at (used for error reporting only).
///
/// Returns `Ok(None)` only at a clean record boundary; a partial record is a
/// `MalformedRecord` error, so a truncated stream can never be mistaken for
/// an empty one.
pub fn read_record<R: Read>(rdr: &mut R, offset: u64) -> Result<Option<TermOccurrence>> {
    let mut buf = [0u8; RECORD_SIZE];
    let mut filled = 0;
    while filled < RECORD_SIZE {
        match rdr.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        RECORD_SIZE => Ok(Some(TermOccurrence::from_bytes(&buf))),
        len => Err(IndexError::MalformedRecord {
            offset,
            detail: format!("{} trailing bytes, expected {}", len, RECORD_SIZE),
        }),
    }
}
