// Task tracker: an HTTP API over an in-memory SQLite store, and a terminal client for it
pub mod app;
