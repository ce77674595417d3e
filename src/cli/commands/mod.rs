pub mod data;
pub mod schema;
