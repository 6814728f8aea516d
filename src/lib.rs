pub mod db;
pub mod platform;
pub mod server;
pub mod services;
pub mod web;
