// Persistent dictionary for a finalized index. The dictionary is split into
// an FST-backed index file and a raw data file: the FST maps each term to
// the starting position of its serialized location entry, which holds the
// length of the serialized value immediately followed by it. Together with
// the occurrence stream and the stats file this forms the full snapshot.

use crate::aux;
use crate::indexing::spill::SpillIndex;
use crate::indexing::IndexState;
use anyhow::{ensure, Result};
use fst::MapBuilder;
use log::info;
use std::collections::BTreeMap;
use std::fs::File;
use std::io;

pub const DICTIONARY_FST_FILE: &str = "dictionary.fst";
pub const DICTIONARY_DATA_FILE: &str = "dictionary_data.bin";

/// Writes the dictionary files for a finalized index into its directory,
/// next to the occurrence stream the index already maintains there.
pub fn write_snapshot(index: &SpillIndex) -> Result<()> {
    ensure!(
        index.state() == IndexState::Queryable,
        "snapshot requires a finalized index, not one still {:?}",
        index.state()
    );

    let positions = create_dictionary_data(index)?;
    create_dictionary_fst(index, &positions)?;
    info!(
        "snapshot written to {} ({} terms)",
        index.directory().display(),
        positions.len()
    );
    Ok(())
}

fn create_dictionary_data(index: &SpillIndex) -> Result<BTreeMap<String, u64>> {
    let mut file = File::create(index.directory().join(DICTIONARY_DATA_FILE))?;
    let mut positions: BTreeMap<String, u64> = BTreeMap::new();

    for (term, location) in index.term_locations() {
        let serialized_value = aux::serialize_value(location)?;

        // Write its length first!
        let (start_position, _end_position) =
            aux::write_value(&mut file, &serialized_value.len())?;
        aux::write_buffer(&mut file, &serialized_value)?;

        // And store that length's start position
        positions.insert(term.to_string(), start_position);
    }

    Ok(positions)
}

fn create_dictionary_fst(index: &SpillIndex, positions: &BTreeMap<String, u64>) -> Result<()> {
    let wtr = io::BufWriter::new(File::create(
        index.directory().join(DICTIONARY_FST_FILE),
    )?);

    let mut build = MapBuilder::new(wtr)?;
    for (term, pos) in positions {
        build.insert(term, *pos)?;
    }
    build.finish()?;

    Ok(())
}
