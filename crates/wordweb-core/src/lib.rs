//! WordWeb Core - Words and the payloads that describe them
//!
//! This crate holds the pieces every other WordWeb crate agrees on:
//! how a raw word becomes a stable identifier, which words are acceptable
//! navigation targets, and the shape of the data a word provider returns.
//!
//! # Example
//!
//! ```
//! use wordweb_core::{is_valid_word, normalize_word};
//!
//! assert_eq!(normalize_word("  IRMAK   Kıyısı "), "ırmak kıyısı");
//! assert!(is_valid_word("İstanbul"));
//! ```

mod error;
mod payload;
pub mod text;

pub use error::{Result, WordError};
pub use payload::WordPayload;
pub use text::{
    dedupe_words, format_display_word, is_valid_word, normalize_word, sanitize_input,
    truncate_text,
};
