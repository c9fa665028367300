//! Tools exposed to the events agent.
//!
//! - Clock: current local date and time
//! - Events: Visit NH events for a date range

pub mod clock;
pub mod events;

pub use clock::ClockTool;
pub use events::{
    format_events, EventRecord, EventsConfig, EventsLookupTool, EventsQuery,
    DEFAULT_EVENTS_ENDPOINT, NO_EVENTS_MESSAGE,
};

use crate::error::Result;
use crate::tool::ToolRegistry;

/// Registry holding the clock and the events lookup.
pub fn events_toolkit(config: EventsConfig) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(ClockTool)?;
    registry.register(EventsLookupTool::new(config)?)?;
    Ok(registry)
}
