//! The interval model: a timestamped, leveled, tagged observation with a
//! structured locator and message, plus the ordered collection type.

pub mod interval;
pub mod intervals;
pub mod level;
pub mod locator;
pub mod message;
pub mod source;

pub use interval::{Interval, IntervalBuilder};
pub use intervals::{compare_intervals, Intervals};
pub use level::Level;
pub use locator::{keys, BackendConnectionType, Locator, LocatorBuilder, LocatorType};
pub use message::{annotations, Message, MessageBuilder};
pub use source::{IntervalReason, IntervalSource};
