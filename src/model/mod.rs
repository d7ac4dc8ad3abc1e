pub mod board;
pub mod config;
pub mod filter;
pub mod section;
pub mod task;

pub use board::*;
pub use config::*;
pub use filter::*;
pub use section::*;
pub use task::*;
