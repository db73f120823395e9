use anyhow::Result;

use super::event::EventEnvelope;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// 1. Commands are validated against current state before anything changes
// 2. A validated command yields events; events are applied to produce state
// 3. A command either applies all of its events or none of them
//
// ============================================================================

/// Generic Aggregate trait
///
/// Type Parameters:
/// - `Event`: The domain event type for this aggregate
/// - `Command`: The command type for this aggregate
/// - `Error`: The error type for business rule violations
pub trait Aggregate: Sized + Clone {
    type Event: Clone;
    type Command;
    type Error;

    /// Create new aggregate from first event
    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error>;

    /// Apply subsequent events to update state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Handle command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Get aggregate ID
    fn aggregate_id(&self) -> i64;

    /// Get current version (number of applied events)
    fn version(&self) -> i64;

    /// Handle a command and apply its events.
    ///
    /// Events are applied to a copy that replaces `self` only when every
    /// event applied cleanly, so a failing command leaves the aggregate as it was.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(command)?;
        if events.is_empty() {
            return Ok(events);
        }

        let mut next = self.clone();
        for event in &events {
            next.apply_event(event)?;
        }
        *self = next;

        Ok(events)
    }

    /// Rebuild an aggregate from its event history
    fn load_from_events(events: Vec<EventEnvelope<Self::Event>>) -> Result<Self>
    where
        Self::Error: std::fmt::Display,
    {
        if events.is_empty() {
            anyhow::bail!("No events to load");
        }

        let mut aggregate = Self::apply_first_event(&events[0].event_data)
            .map_err(|e| anyhow::anyhow!("Failed to apply first event: {}", e))?;

        for envelope in events.iter().skip(1) {
            aggregate
                .apply_event(&envelope.event_data)
                .map_err(|e| anyhow::anyhow!("Failed to apply event: {}", e))?;
        }

        Ok(aggregate)
    }
}
