pub mod config;
pub mod db;
pub mod db_manager;
pub mod logging;
