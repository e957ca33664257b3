pub mod episodes;

pub use episodes::{SelectionError, parse_selection};
