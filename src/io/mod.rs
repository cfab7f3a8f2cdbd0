pub mod config_io;
pub mod store;

pub use config_io::*;
pub use store::*;
