//! Text processing module
//!
//! This module turns raw input into the stemmed word tokens the index
//! stores, and enumerates the text files of a local corpus:
//! - cleaning (Unicode decomposition, combining-mark stripping, lowercasing)
//! - splitting into word tokens and Snowball stemming
//! - walking a directory tree for `.txt`/`.text` files

mod stemmer;
mod walker;

pub use stemmer::{clean, parse, stems, unique_stems};
pub use walker::{is_text_file, list_text_files};
