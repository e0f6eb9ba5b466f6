pub mod db;
pub mod error;
pub mod ingest;
pub mod query;
pub mod store;

#[cfg(test)]
pub mod testing;
