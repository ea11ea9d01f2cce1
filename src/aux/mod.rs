// Serialization helpers shared by the snapshot writer and the retrieval
// side: bincode encoding plus position-tracked appends to a data file.

use anyhow::{Context, Result};
use fst::Map;
use memmap::Mmap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

pub fn serialize_value<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize,
{
    Ok(bincode::serialize(value)?)
}

/// Appends `value` at the file's current position, returning the byte range
/// `(start, end)` it occupies.
pub fn write_value<T>(file: &mut File, value: &T) -> Result<(u64, u64)>
where
    T: Serialize,
{
    let serialized_value = bincode::serialize(value)?;
    write_buffer(file, &serialized_value)
}

pub fn write_buffer(file: &mut File, buffer: &[u8]) -> Result<(u64, u64)> {
    let start_position = file.seek(SeekFrom::Current(0))?;
    file.write_all(buffer)?;
    let end_position = file.seek(SeekFrom::Current(0))?;

    Ok((start_position, end_position))
}

/// Deserializes a `T` from the mmapped byte range `start..end`.
pub fn read_value_from_mmap<T>(mmap: &Mmap, start: u64, end: u64) -> Result<T>
where
    T: DeserializeOwned,
{
    let slice = mmap
        .get(start as usize..end as usize)
        .with_context(|| format!("byte range {}..{} lies outside the data file", start, end))?;

    Ok(bincode::deserialize(slice)?)
}

pub fn query_fst_u64(fst_map: &Map<Mmap>, key: &str) -> Option<u64> {
    fst_map.get(key)
}
