pub mod csvio;
pub mod error;
pub mod grades;
pub mod identity;
pub mod mapping;
pub mod pipeline;
pub mod pseudonym;
pub mod rewrite;
pub mod schema;
pub mod table;
pub mod xlsx;

pub use error::{AnonymizeError, Result};
pub use grades::anonymize_grades_file;
pub use pipeline::{anonymize_logs_file, PassSummary, Session};
pub use table::{Cell, Table};
