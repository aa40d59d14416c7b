//! Error types for the docextract library.
//!
//! Every fatal condition is a variant of [`DocExtractError`]. Callers that
//! need to branch on the *class* of failure (bad configuration, bad input
//! file, bad side-channel values, provider trouble) use
//! [`DocExtractError::kind`] instead of matching every variant.
//!
//! Post-hoc field validation is not an error: it is reported as a `bool`
//! by the processors' `validate` functions.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`DocExtractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unsupported provider / document type, invalid builder values.
    /// Always raised before any I/O.
    Configuration,
    /// The input file is missing, of the wrong type, or yields no text.
    /// Always raised before any model call.
    Input,
    /// A required dependency is missing or has the wrong type.
    /// Always raised before any model call.
    Dependency,
    /// The LLM call failed or its reply could not be parsed.
    Provider,
    /// Unexpected internal failure.
    Internal,
}

/// All fatal errors returned by the docextract library.
#[derive(Debug, Error)]
pub enum DocExtractError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The provider name is not in the registry.
    #[error("Unsupported provider: '{name}'\nSupported providers: openai, anthropic")]
    UnsupportedProvider { name: String },

    /// The document-type tag is not recognised.
    #[error("Unsupported document type: '{name}'\nSupported types: aadhaar_front, aadhaar_back, pan, form16")]
    UnsupportedDocumentType { name: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The provider could not be constructed (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install\n\
pdfium system-wide so it can be found by the dynamic loader.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The extension is neither PDF nor a supported image format.
    #[error("Unsupported file type: '{extension}' ({path})\nSupported: pdf, jpg, jpeg, png")]
    UnsupportedFileType { path: PathBuf, extension: String },

    /// The file carries a `.pdf` extension but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The image could not be decoded.
    #[error("Failed to load image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The OCR engine itself failed to run.
    #[error("OCR failed: {0}")]
    OcrFailed(String),

    /// OCR or PDF extraction produced only whitespace.
    #[error("No text was extracted from '{path}'")]
    NoTextExtracted { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    // ── Dependency errors ─────────────────────────────────────────────────
    /// A dependency declared as required was not supplied.
    #[error("Required dependency '{name}' not provided")]
    MissingDependency { name: String },

    /// A dependency was supplied with a value of the wrong kind.
    #[error("Dependency '{name}' should be of type {expected}")]
    DependencyTypeMismatch { name: String, expected: String },

    // ── Provider errors ───────────────────────────────────────────────────
    /// Transport-level failure talking to the LLM API, or a non-2xx reply.
    #[error("LLM request to '{provider}' failed: {message}")]
    ProviderRequest { provider: String, message: String },

    /// The API replied but the body did not have the expected shape.
    #[error("Unexpected response from '{provider}': {message}")]
    ProviderResponse { provider: String, message: String },

    /// The model's text could not be deserialised into the output schema.
    #[error("Model output does not match the {schema} schema: {detail}")]
    SchemaParse { schema: &'static str, detail: String },

    // ── Internal errors ───────────────────────────────────────────────────
    /// Serialising the extracted record failed.
    #[error("Failed to serialise extraction result: {0}")]
    OutputSerialization(#[from] serde_json::Error),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocExtractError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use DocExtractError::*;
        match self {
            UnsupportedProvider { .. }
            | UnsupportedDocumentType { .. }
            | InvalidConfig(_)
            | ProviderNotConfigured { .. }
            | PdfiumBindingFailed(_) => ErrorKind::Configuration,
            FileNotFound { .. }
            | PermissionDenied { .. }
            | ReadFailed { .. }
            | UnsupportedFileType { .. }
            | NotAPdf { .. }
            | ImageDecode { .. }
            | CorruptPdf { .. }
            | PasswordRequired { .. }
            | WrongPassword { .. }
            | OcrFailed(_)
            | NoTextExtracted { .. }
            | DownloadFailed { .. } => ErrorKind::Input,
            MissingDependency { .. } | DependencyTypeMismatch { .. } => ErrorKind::Dependency,
            ProviderRequest { .. } | ProviderResponse { .. } | SchemaParse { .. } => {
                ErrorKind::Provider
            }
            OutputSerialization(_) | Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_provider_display() {
        let e = DocExtractError::UnsupportedProvider {
            name: "gemini".into(),
        };
        assert!(e.to_string().contains("gemini"), "got: {e}");
        assert_eq!(e.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn missing_dependency_display() {
        let e = DocExtractError::MissingDependency {
            name: "pan_number".into(),
        };
        assert_eq!(e.to_string(), "Required dependency 'pan_number' not provided");
        assert_eq!(e.kind(), ErrorKind::Dependency);
    }

    #[test]
    fn type_mismatch_display() {
        let e = DocExtractError::DependencyTypeMismatch {
            name: "amounts".into(),
            expected: "list of number".into(),
        };
        assert!(e.to_string().contains("list of number"));
    }

    #[test]
    fn input_errors_are_classified() {
        let e = DocExtractError::UnsupportedFileType {
            path: PathBuf::from("scan.docx"),
            extension: "docx".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Input);
        let e = DocExtractError::NoTextExtracted {
            path: PathBuf::from("blank.png"),
        };
        assert_eq!(e.kind(), ErrorKind::Input);
    }

    #[test]
    fn schema_parse_is_provider_error() {
        let e = DocExtractError::SchemaParse {
            schema: "PanCard",
            detail: "missing field".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Provider);
        assert!(e.to_string().contains("PanCard"));
    }
}
