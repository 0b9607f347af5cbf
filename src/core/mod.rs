pub mod adapters;
pub mod backends;
pub mod config;
pub mod error;
pub mod fragment;
pub mod message;
pub mod providers;
pub mod session;
pub mod splitter;
