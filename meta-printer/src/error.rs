//! Printer errors

use meta_cursor::CursorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Formatting error")]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, PrinterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_error_from() {
        let err: PrinterError = CursorError::NothingSelected.into();
        assert_eq!(err.to_string(), "Cursor error: No element is selected");
    }

    #[test]
    fn test_fmt_error_from() {
        let err: PrinterError = std::fmt::Error.into();
        assert_eq!(err.to_string(), "Formatting error");
    }
}
