pub mod db;
pub mod models;
mod profiles;
mod sessions;
mod software;
mod tables;

pub use db::{Database, DatabaseError};
pub use tables::*;
