pub mod focus;

pub use focus::*;
