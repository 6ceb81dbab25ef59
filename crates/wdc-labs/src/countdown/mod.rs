//! Countdown to the cohort deadline shown in the landing hero.

pub mod breakdown;
pub mod clock;
pub mod time;

pub use breakdown::CountdownBreakdown;
pub use clock::{CountdownClock, CountdownTicks, TICK_BUFFER, TICK_PERIOD};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
