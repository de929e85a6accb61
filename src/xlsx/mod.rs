pub mod reader;
pub mod writer;

pub use reader::{read_first_sheet, Sheet};
pub use writer::write_table_to_xlsx;
