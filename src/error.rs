use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnonymizeError {
    #[error("Identity without a pseudonym at {0}")]
    UnmappedIdentity(String),

    #[error("Cannot draw {requested} distinct user ids, only {available} available in range")]
    IdSpaceExhausted { requested: usize, available: usize },

    #[error("{0} real name(s) already handed out as pseudonyms; reserve every file's names before the first pass")]
    PseudonymCollision(usize),

    #[error("Mapping file error: {0}")]
    Mapping(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Workbook has no worksheets: {0}")]
    EmptyWorkbook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel write error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),
}

pub type Result<T> = std::result::Result<T, AnonymizeError>;
