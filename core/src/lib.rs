pub mod candidates;
pub mod config;
pub mod determinism;
pub mod facts;
pub mod oracle;
pub mod report;
pub mod run;

pub mod error;
