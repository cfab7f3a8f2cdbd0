pub mod contrib;
pub mod import;
pub mod task_ops;
pub mod views;

pub use contrib::*;
pub use import::*;
pub use task_ops::*;
pub use views::*;
