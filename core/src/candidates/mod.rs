pub mod dependencies;
pub mod pairs;
