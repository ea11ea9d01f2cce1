// End-to-end checks over the whole pipeline: HTML corpus -> normalization
// -> index -> snapshot -> retrieval, plus the equivalence of the two
// storage variants under different buffer capacities.

use indexer_mcspillface::document_reader::DocumentReader;
use indexer_mcspillface::indexing::{
    read_record, write_snapshot, Index, IndexStats, Indexer, MemoryIndex, SpillConfig,
    SpillIndex, TermOccurrence, RECORD_SIZE,
};
use indexer_mcspillface::retrieval::Retriever;
use indexer_mcspillface::tokenizer::Normalizer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::path::Path;
use tempfile::tempdir;

fn write_corpus(dir: &Path) {
    fs::write(
        dir.join("100102.html"),
        "<html><body>Ser ou n\u{e3}o ser, eis a quest\u{e3}o: a casa \u{e9} a casa verde.</body></html>",
    )
    .unwrap();
    fs::write(dir.join("111.html"), "<html><body>A casa verde</body></html>").unwrap();
}

#[test]
fn html_corpus_builds_the_expected_vocabulary() {
    let corpus = tempdir().unwrap();
    write_corpus(corpus.path());

    let reader = DocumentReader::new(corpus.path()).unwrap();
    let mut indexer = Indexer::new(MemoryIndex::new(), Normalizer::default());
    indexer.index_documents(reader.process_documents()).unwrap();
    indexer.finish().unwrap();
    let index = indexer.into_index();

    // Ids follow first appearance; doc 100102 sorts first by path.
    assert_eq!(index.vocabulary(), &["eis", "questa", "cas", "verd"]);
    assert_eq!(index.document_count(), 2);

    assert_eq!(
        index.occurrences("cas").unwrap(),
        vec![
            TermOccurrence::new(100_102, 3, 2),
            TermOccurrence::new(111, 3, 1),
        ]
    );
    assert_eq!(index.document_count_with_term("cas"), 2);
    assert_eq!(index.document_count_with_term("verd"), 2);
    assert_eq!(index.document_count_with_term("eis"), 1);

    // Unknown terms read as empty, never as an error.
    assert!(index.occurrences("inexistente").unwrap().is_empty());
    assert_eq!(index.document_count_with_term("inexistente"), 0);
}

// One synthetic occurrence stream fed identically to every index under
// test. Documents arrive in ascending id order and each term occurs at
// most once per document, so postings are comparable verbatim.
fn synthetic_events(seed: u64) -> Vec<(String, u32, u32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let vocabulary: Vec<String> = (0..40).map(|t| format!("termo{:02}", t)).collect();

    let mut events = Vec::new();
    for doc_id in 0..60 {
        for term in &vocabulary {
            if rng.gen_bool(0.3) {
                events.push((term.clone(), doc_id, rng.gen_range(1..=5)));
            }
        }
    }
    events
}

#[test]
fn storage_variants_agree_on_every_posting() {
    let events = synthetic_events(7);

    let mut memory = MemoryIndex::new();
    let dirs = [tempdir().unwrap(), tempdir().unwrap(), tempdir().unwrap()];
    let mut spills = vec![
        SpillIndex::new(SpillConfig::new(dirs[0].path()).with_buffer_capacity(1)).unwrap(),
        SpillIndex::new(SpillConfig::new(dirs[1].path()).with_buffer_capacity(7)).unwrap(),
        SpillIndex::new(SpillConfig::new(dirs[2].path()).with_buffer_capacity(10_000)).unwrap(),
    ];

    for (term, doc_id, term_freq) in &events {
        memory.index(term, *doc_id, *term_freq).unwrap();
        for spill in &mut spills {
            spill.index(term, *doc_id, *term_freq).unwrap();
        }
    }
    memory.finish().unwrap();
    for spill in &mut spills {
        spill.finish().unwrap();
    }

    // The big buffer never fills during indexing, so only the final flush
    // spills; capacity one spills on every single record.
    assert_eq!(spills[2].spill_count(), 1);
    assert_eq!(spills[0].spill_count(), events.len() as u64);

    for spill in &spills {
        assert_eq!(spill.vocabulary(), memory.vocabulary());
        assert_eq!(spill.document_count(), memory.document_count());

        for term in memory.vocabulary() {
            assert_eq!(
                spill.occurrences(term).unwrap(),
                memory.occurrences(term).unwrap(),
                "postings diverge for {}",
                term
            );
            assert_eq!(
                spill.document_count_with_term(term),
                memory.document_count_with_term(term)
            );
        }
    }
}

#[test]
fn stream_is_sorted_with_contiguous_runs() {
    let events = synthetic_events(13);
    let dir = tempdir().unwrap();
    let mut index =
        SpillIndex::new(SpillConfig::new(dir.path()).with_buffer_capacity(17)).unwrap();
    for (term, doc_id, term_freq) in &events {
        index.index(term, *doc_id, *term_freq).unwrap();
    }
    index.finish().unwrap();
    assert!(index.spill_count() > 1);

    let mut file = File::open(index.stream_path()).unwrap();
    let mut offset = 0u64;
    let mut records = Vec::new();
    while let Some(rec) = read_record(&mut file, offset).unwrap() {
        records.push(rec);
        offset += RECORD_SIZE as u64;
    }
    assert_eq!(records.len(), events.len());

    let mut finished_terms = Vec::new();
    let mut current_term = 0u32;
    for pair in records.windows(2) {
        assert!(pair[0] <= pair[1], "stream out of order: {:?}", pair);
    }
    for rec in &records {
        if rec.term_id != current_term {
            assert!(
                !finished_terms.contains(&rec.term_id),
                "term {} appears in two separate runs",
                rec.term_id
            );
            finished_terms.push(current_term);
            current_term = rec.term_id;
        }
    }
}

#[test]
fn snapshot_round_trips_through_the_retriever() {
    let corpus = tempdir().unwrap();
    write_corpus(corpus.path());
    fs::write(
        corpus.path().join("7.html"),
        "<p>Uma parede verde, outra parede azul.</p>",
    )
    .unwrap();

    let index_dir = tempdir().unwrap();
    let reader = DocumentReader::new(corpus.path()).unwrap();
    let index =
        SpillIndex::new(SpillConfig::new(index_dir.path()).with_buffer_capacity(3)).unwrap();
    let mut indexer = Indexer::new(index, Normalizer::default());
    indexer.index_documents(reader.process_documents()).unwrap();
    let stats = indexer.finish().unwrap();
    let index = indexer.into_index();

    write_snapshot(&index).unwrap();
    stats.write_to(index.directory()).unwrap();

    let retriever = Retriever::open(index_dir.path()).unwrap();
    assert_eq!(retriever.document_count(), 3);
    assert_eq!(retriever.stats(), &IndexStats::load_from(index_dir.path()).unwrap());

    let mut expected_vocabulary = index.vocabulary().to_vec();
    expected_vocabulary.sort();
    assert_eq!(retriever.vocabulary(), expected_vocabulary);

    for term in index.vocabulary() {
        assert_eq!(
            retriever.occurrences(term).unwrap(),
            index.occurrences(term).unwrap(),
            "snapshot postings diverge for {}",
            term
        );
        assert_eq!(
            retriever.document_count_with_term(term).unwrap(),
            index.document_count_with_term(term)
        );
    }
    assert!(retriever.occurrences("inexistente").unwrap().is_empty());
}

#[test]
fn truncated_stream_surfaces_as_an_error_after_snapshot() {
    let index_dir = tempdir().unwrap();
    let mut index = SpillIndex::new(SpillConfig::new(index_dir.path())).unwrap();
    for doc_id in 0..4 {
        index.index("cas", doc_id, 1).unwrap();
    }
    index.finish().unwrap();
    write_snapshot(&index).unwrap();
    IndexStats {
        documents: 4,
        terms: 1,
        occurrences: 4,
        elapsed_secs: 0.0,
    }
    .write_to(index_dir.path())
    .unwrap();

    // Chop one record in half behind the snapshot's back.
    let stream_path = index.stream_path();
    let bytes = fs::read(&stream_path).unwrap();
    fs::write(&stream_path, &bytes[..bytes.len() - RECORD_SIZE / 2]).unwrap();

    let retriever = Retriever::open(index_dir.path()).unwrap();
    assert!(retriever.occurrences("cas").is_err());
}

#[test]
fn empty_corpus_round_trips() {
    let corpus = tempdir().unwrap();
    let index_dir = tempdir().unwrap();

    let reader = DocumentReader::new(corpus.path()).unwrap();
    let index = SpillIndex::new(SpillConfig::new(index_dir.path())).unwrap();
    let mut indexer = Indexer::new(index, Normalizer::default());
    indexer.index_documents(reader.process_documents()).unwrap();
    let stats = indexer.finish().unwrap();
    let index = indexer.into_index();

    write_snapshot(&index).unwrap();
    stats.write_to(index.directory()).unwrap();

    let retriever = Retriever::open(index_dir.path()).unwrap();
    assert_eq!(retriever.document_count(), 0);
    assert!(retriever.vocabulary().is_empty());
    assert!(retriever.occurrences("cas").unwrap().is_empty());
    assert_eq!(retriever.document_count_with_term("cas").unwrap(), 0);
}
