pub mod discovery;
pub mod extractor;
pub mod model;
pub mod store;
