use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("sample list {0:?} must start with '['")]
    MissingOpen(String),
    #[error("sample list {0:?} must end with ']'")]
    MissingClose(String),
    #[error("sample list {cell:?} has an empty entry at position {index}")]
    EmptyEntry { cell: String, index: usize },
    #[error("sample list {cell:?} has non-numeric entry {token:?}")]
    NotANumber { cell: String, token: String },
    #[error("{series} has {found} samples, expected {expected}")]
    LengthMismatch {
        series: String,
        expected: usize,
        found: usize,
    },
}

/// Decode a bracketed list cell such as `"[1.0, 2.5, -3]"`.
///
/// Grammar: `[`, zero or more comma separated finite floats, `]`, with
/// whitespace allowed around every token. Anything else fails.
pub fn decode_sample_list(cell: &str) -> Result<Vec<f64>, DecodeError> {
    let trimmed = cell.trim();
    let inner = trimmed
        .strip_prefix('[')
        .ok_or_else(|| DecodeError::MissingOpen(cell.to_string()))?
        .strip_suffix(']')
        .ok_or_else(|| DecodeError::MissingClose(cell.to_string()))?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .enumerate()
        .map(|(index, token)| {
            let token = token.trim();
            if token.is_empty() {
                return Err(DecodeError::EmptyEntry {
                    cell: cell.to_string(),
                    index,
                });
            }
            match token.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(DecodeError::NotANumber {
                    cell: cell.to_string(),
                    token: token.to_string(),
                }),
            }
        })
        .collect()
}
