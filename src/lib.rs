pub mod client;
pub mod config;
pub mod constants;
#[cfg(feature = "db")]
pub mod db;
pub mod domain;
pub mod error;
pub mod filters;
pub mod graphql;
pub mod jobs;
pub mod logging;
pub mod seeder;
pub mod server;
pub mod storage;
pub mod validation;
