//! Extension routing and multi-format loading

mod loader;
mod parser;
mod router;

pub use loader::{load_document, load_document_with, FileLoader};
pub use parser::FileParser;
pub use router::{discover_files, is_supported, route};
