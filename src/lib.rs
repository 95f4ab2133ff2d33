#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod filter;
pub mod login;
mod panels;
pub mod progress;
pub mod results;
pub mod selection;
pub mod settings;
pub mod status;
pub mod tasks;
mod utils;
pub use app::{App, Route};
pub use dashboard::Dashboard;
pub use error::DashError;
