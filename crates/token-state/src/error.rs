use thiserror::Error;

/// Encoding or decoding a fixed-layout record failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{record} needs {expected} bytes, buffer has {actual}")]
    BufferTooSmall {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
}
