pub mod types;

pub use types::{AsteroidRecord, DateRange, Locale};
