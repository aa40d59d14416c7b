//! Pipeline stages that turn an input file into prompt-ready text.
//!
//! Each submodule implements exactly one step, so each can be tested on
//! its own and the OCR or PDF backend can be swapped without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//!                ┌──▶ ocr (image: grayscale, Otsu, Tesseract) ──┐
//! input ──▶ kind ┤                                              ├──▶ chunks
//! (URL/path)     └──▶ pdf (pdfium text layer, page chunking) ───┘
//! ```
//!
//! 1. [`input`]: resolve the path or URL to a local file and classify it
//! 2. [`ocr`]: image inputs; one chunk per image
//! 3. [`pdf`]: PDF inputs; pages grouped up to the chunk size
//! 4. [`postprocess`]: text clean-up, and JSON recovery from model replies

pub mod input;
pub mod ocr;
pub mod pdf;
pub mod postprocess;
