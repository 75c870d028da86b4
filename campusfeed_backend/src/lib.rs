pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod feed;
pub mod moderation;
pub mod notifications;
pub mod oracles;
pub mod posts;
pub mod social;
pub mod telemetry;
pub mod university;
pub mod users;
pub mod utils;
