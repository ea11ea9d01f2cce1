use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Snapshot file the build summary is stored in.
pub const STATS_FILE: &str = "index_stats.json";

/// Summary of a finished build, persisted alongside the snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub occurrences: u64,
    pub elapsed_secs: f64,
}

impl IndexStats {
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<()> {
        let path = dir.join(STATS_FILE);
        let stats_json = serde_json::to_string(self)?;

        let mut wtr = BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        );
        wtr.write_all(stats_json.as_bytes())?;
        wtr.flush()?;
        Ok(())
    }

    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join(STATS_FILE);
        let rdr = BufReader::new(
            File::open(&path).with_context(|| format!("opening {}", path.display()))?,
        );
        Ok(serde_json::from_reader(rdr)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stats_round_trip_through_json() {
        let dir = tempdir().unwrap();
        let stats = IndexStats {
            documents: 2,
            terms: 14,
            occurrences: 31,
            elapsed_secs: 0.25,
        };
        stats.write_to(dir.path()).unwrap();
        assert_eq!(IndexStats::load_from(dir.path()).unwrap(), stats);
    }
}
