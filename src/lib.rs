pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod facade;
pub mod handlers;
pub mod middleware;
pub mod resources;
pub mod schema;
pub mod server;
pub mod store;
pub mod types;

#[cfg(test)]
pub mod testing;
