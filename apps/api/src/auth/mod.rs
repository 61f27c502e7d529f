pub mod extract;
pub mod guard;
pub mod handlers;
pub mod provider;
pub mod session;
