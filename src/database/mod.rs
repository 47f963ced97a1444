pub mod client;
pub mod query_builder;
pub mod repositories;
pub mod surrdb_utils;
pub mod table_names;
