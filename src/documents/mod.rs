//! Document discovery and text extraction

pub mod extractor;
pub mod locator;

pub use extractor::{PdfExtractor, TextExtractor};
pub use locator::{find_pdf_files, locate_pdf_files};
