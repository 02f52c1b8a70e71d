use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlyError {
    #[error("Header parse error: {0}")]
    HeaderParse(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Row {index} out of range (record count {count})")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("Decoded {completed} of {total} rows before failing: {source}")]
    PartialDecode {
        completed: usize,
        total: usize,
        #[source]
        source: Box<PlyError>,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlyError>;

impl PlyError {
    /// Wraps a row-level failure, reporting how many rows completed first.
    ///
    /// A failure on the very first row is returned unchanged, since nothing
    /// was partially produced.
    pub fn partial(completed: usize, total: usize, source: PlyError) -> PlyError {
        if completed == 0 {
            source
        } else {
            PlyError::PartialDecode {
                completed,
                total,
                source: Box::new(source),
            }
        }
    }

    pub fn header(msg: impl Into<String>) -> PlyError {
        PlyError::HeaderParse(msg.into())
    }

    /// Rows successfully handled before the error, if the error is partial.
    pub fn completed_rows(&self) -> Option<usize> {
        match self {
            PlyError::PartialDecode { completed, .. } => Some(*completed),
            _ => None,
        }
    }
}
