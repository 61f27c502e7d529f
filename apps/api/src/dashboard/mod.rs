pub mod handlers;
pub mod progress;
