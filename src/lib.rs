//! Inverted index construction over an HTML corpus.
//!
//! The `indexing` module builds the index, either fully in memory or with
//! a disk-backed occurrence stream for corpora that outgrow RAM, and the
//! `retrieval` module reads the resulting snapshot back.

pub mod aux;
pub mod document_reader;
pub mod indexing;
pub mod retrieval;
pub mod tokenizer;
