pub mod formatter;

pub use formatter::{OutputOptions, format_jsonl_output, format_plain_output};
