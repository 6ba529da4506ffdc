pub mod antenna;

pub use antenna::{load_antenna, Antenna};
