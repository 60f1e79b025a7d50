pub mod database;
pub mod users;
