pub mod handlers;
pub mod intake;
pub mod models;
pub mod router;
pub mod services;
