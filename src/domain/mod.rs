pub mod models;
pub mod schema;
pub mod submission;
pub mod validate;
