//! Supabase (PostgREST) table sink

pub mod client;
pub mod filter;
pub mod sink;

pub use client::SupabaseCredentials;
pub use filter::Filter;
pub use sink::TableSink;
