//! Google Sheets output sink

pub mod a1;
pub mod auth;
pub mod client;
pub mod models;
pub mod sink;

pub use auth::ServiceAccountKey;
pub use sink::{SheetSink, SheetTarget};
