use thiserror::Error;

/// Errors a format parser can surface to its caller.
///
/// Heuristic formats (legacy, plain text, web) never produce these; only the
/// self-describing structured formats and the registry do.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Content claimed to be JSON but could not be decoded
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Content decoded but its shape is not a recipe or list of recipes
    #[error("Unsupported structure: {0}")]
    UnsupportedStructure(String),

    /// No registered parser accepted the content
    #[error("No parser could handle this content")]
    NoParserMatched,

    /// Direct lookup by name or source type found nothing
    #[error("Unknown parser: {0}")]
    UnknownParser(String),
}

/// Errors raised by a taxonomy repository.
///
/// The resolver and linker swallow these per component; they never abort a
/// whole decomposition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaxonomyError {
    /// Lookup against the taxonomy failed
    #[error("Taxonomy lookup failed: {0}")]
    Lookup(String),

    /// Writing a component link failed
    #[error("Failed to link component: {0}")]
    Link(String),

    /// Lookup did not complete within the configured budget
    #[error("Taxonomy lookup timed out after {0} ms")]
    Timeout(u64),
}

/// Top-level error for configuration loading and the command-line wrapper
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command-line usage
    #[error("Usage error: {0}")]
    Usage(String),
}
