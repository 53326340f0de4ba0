pub mod endpoint;
pub mod interface;
pub mod openai;
pub mod prompt;
pub mod response;
