//! Core pipeline orchestration and domain logic for the word-list builder.
//!
//! This crate ties the pinned source (see `wordlist-source`) to the
//! external generator, the normalizer, notice collection and metadata
//! into one end-to-end build (`build_words`).

pub mod generator;
pub mod meta;
pub mod normalize;
pub mod notices;
pub mod pipeline;
