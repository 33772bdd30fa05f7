// Document text extraction.
// Fetch once, classify (PDF / Word / plain), then run the matching strategy.
// PDFs walk an ordered fallback chain: text layer -> local OCR -> hosted OCR.
// Stage failures never escape; they are recorded as diagnostics.

pub mod classify;
pub mod fetch;
pub mod handlers;
pub mod ocr;
pub mod outcome;
pub mod pdf;
pub mod pipeline;
pub mod word;

#[cfg(test)]
pub(crate) mod fixtures;

pub use pipeline::ExtractionPipeline;
