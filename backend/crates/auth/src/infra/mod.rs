//! Infrastructure Layer

pub mod sqlite;
