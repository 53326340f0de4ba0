pub mod manifest;
pub mod schema;
pub mod writer;
