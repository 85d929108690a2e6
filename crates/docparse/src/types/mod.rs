//! Core types for document loading

pub mod document;

pub use document::{DocumentRecord, FileType, FILE_TYPE_KEY, SOURCE_KEY};
