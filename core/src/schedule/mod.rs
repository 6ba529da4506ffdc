pub mod azel;

pub use azel::{annotate_schedule, AnnotateSummary};
