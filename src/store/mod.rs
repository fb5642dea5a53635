//! Persistence of call results.

mod csv;

pub use csv::{
    input_headers, migrate_content, CsvAppender, CsvRecord, SchemaAction,
    FORMATTED_RESULT_COLUMN, POOL_NAME_COLUMN, UNKNOWN_POOL,
};
