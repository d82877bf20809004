#![forbid(unsafe_code)]

pub mod enrich;
pub mod model;
pub mod time;

pub use time::Clock;
