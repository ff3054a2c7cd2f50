// ❗ Extraction errors
// Any of these aborts the whole extraction; lookups never produce one.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("not a Wacai export file name: {0}")]
    UnrecognizedFile(String),

    #[error("failed to open workbook {path}: {message}")]
    Workbook { path: String, message: String },

    #[error("failed to read sheet {sheet}: {message}")]
    SheetRead { sheet: String, message: String },

    #[error("invalid number in sheet {sheet}, cell {column}{row}: {value:?}")]
    InvalidAmount {
        sheet: String,
        row: usize,
        column: char,
        value: String,
    },

    #[error("invalid date in sheet {sheet}, row {row}: {value:?}")]
    InvalidDate {
        sheet: String,
        row: usize,
        value: String,
    },

    #[error("malformed member entry in sheet {sheet}, row {row}: {value:?}")]
    MalformedMember {
        sheet: String,
        row: usize,
        value: String,
    },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
