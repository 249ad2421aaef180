pub mod calendar;
pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
