pub mod aggregate;
pub mod connection;
pub mod repository;
