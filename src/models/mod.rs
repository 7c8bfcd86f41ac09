// Re-export all model types for ease of use

pub mod report;
pub mod search;

pub use report::*;
pub use search::*;
