// Adapters layer: concrete implementations of the domain ports (SQLite storage, HTTP surface)

pub mod http;
pub mod sqlite;
