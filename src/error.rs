use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum BriefError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse a font face
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    /// A page id listed in the page order did not resolve to an allocated page
    #[error("page listed in the page order was not found in the document")]
    PageMissing,
}
