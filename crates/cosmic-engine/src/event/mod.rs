//! Engine events.
//!
//! An `Event` wraps one `EventKind` together with the handled flag that
//! layers set to stop propagation. Categories let handlers filter whole
//! families of events with one mask test.

mod category;
mod kind;

pub use category::Category;
pub use kind::{Event, EventKind, EventType};
