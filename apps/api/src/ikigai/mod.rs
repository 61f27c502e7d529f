pub mod chart;
pub mod dialogue;
pub mod handlers;
pub mod summary;
