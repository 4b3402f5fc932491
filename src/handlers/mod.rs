pub mod app;
pub mod ask;
pub mod auth;
pub mod metrics;
