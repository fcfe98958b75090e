pub mod config;
pub mod error;
pub mod pack;

pub use config::Config;
pub use error::*;
pub use pack::*;
