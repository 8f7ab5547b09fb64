pub mod archive;
pub mod ndjson;
