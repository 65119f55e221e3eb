pub mod source_loader;

pub use source_loader::{load_rows, parse_json_rows, parse_toml_rows};
