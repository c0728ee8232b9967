//! Turning uploaded files into ordered text fragments.

mod extract;
mod splitter;
mod upload;

pub use extract::{
    extract_document, extract_pages_from_path, extract_pdf_pages, extract_pdf_pages_in,
    extract_uploaded, ExtractError, ExtractedDocument, Fragment,
};
pub use splitter::{SplitterConfig, TextSplitter};
pub use upload::TempUpload;
