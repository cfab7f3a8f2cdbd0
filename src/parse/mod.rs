pub mod quick_entry;

pub use quick_entry::{QuickEntry, parse_quick_entry};
