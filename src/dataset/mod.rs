mod prepare;
mod table;

pub use prepare::{
    BOOK_COLUMNS, COMBINED_COLUMN, PrepareSummary, combine_book_columns, prepare_books,
};
pub use table::Table;
