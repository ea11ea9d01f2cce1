use anyhow::{Context, Result};
use indexer_mcspillface::document_reader::DocumentReader;
use indexer_mcspillface::indexing::{write_snapshot, Indexer, SpillConfig, SpillIndex};
use indexer_mcspillface::retrieval::Retriever;
use indexer_mcspillface::tokenizer::{Normalizer, Token};
use indicatif::ProgressBar;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let corpus_dir = PathBuf::from(
        args.next()
            .context("usage: indexer-mcspillface <corpus_dir> [index_dir] [query_term]")?,
    );
    let index_dir = PathBuf::from(args.next().unwrap_or_else(|| "./index".to_string()));
    let query_term = args.next();

    let reader = DocumentReader::new(&corpus_dir)?;
    println!(
        "Indexing {} documents from {}...",
        reader.len(),
        corpus_dir.display()
    );

    let progress = ProgressBar::new(reader.len() as u64);
    let index = SpillIndex::new(SpillConfig::new(&index_dir))?;
    let mut indexer = Indexer::new(index, Normalizer::default());
    indexer
        .index_documents(reader.process_documents().inspect(|_| progress.inc(1)))
        .context("Error during indexing")?;
    let stats = indexer.finish().context("Error finalizing the index")?;
    progress.finish_and_clear();

    let index = indexer.into_index();
    write_snapshot(&index)?;
    stats.write_to(index.directory())?;

    println!(
        "Indexed {} documents, {} terms, {} occurrences in {:.2}s ({} spills)",
        stats.documents,
        stats.terms,
        stats.occurrences,
        stats.elapsed_secs,
        index.spill_count()
    );

    if let Some(raw_term) = query_term {
        match Normalizer::default().normalize(&Token::new(&raw_term)) {
            Some(term) => {
                let retriever =
                    Retriever::open(&index_dir).context("Error opening the snapshot")?;
                let postings = retriever.occurrences(&term)?;

                println!("{:?} appears in {} documents:", term, postings.len());
                for occurrence in postings.iter().take(10) {
                    println!("  {}", occurrence);
                }
                if postings.len() > 10 {
                    println!("  ... and {} more", postings.len() - 10);
                }
            }
            None => println!("{:?} normalizes to nothing, not looking it up", raw_term),
        }
    }

    Ok(())
}
