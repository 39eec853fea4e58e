pub mod challenge;
pub mod progress;
