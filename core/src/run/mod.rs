pub mod lifecycle;
pub mod runner;
