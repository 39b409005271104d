//! Bus trip search server.
//!
//! Answers "which buses can I board from this stop to that stop, no
//! earlier than this time?" over a SQLite schedule database, and serves
//! the answers as JSON over HTTP.

pub mod cli;
pub mod domain;
pub mod search;
pub mod store;
pub mod web;
