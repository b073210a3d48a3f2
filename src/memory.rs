//! Per-session conversational memory

use tracing::debug;

use crate::models::ResolvedLocation;

/// Last successfully resolved location of one conversation.
///
/// Created empty when a session starts and dropped with it; never shared
/// between sessions and never expires on its own.
#[derive(Debug, Default, Clone)]
pub struct LocationMemory {
    last: Option<ResolvedLocation>,
}

impl LocationMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Location to fall back to when a turn names none
    #[must_use]
    pub fn get(&self) -> Option<&ResolvedLocation> {
        self.last.as_ref()
    }

    /// Remember a location that was geocoded successfully in the current turn
    pub fn set(&mut self, location: ResolvedLocation) {
        debug!("Remembering location: {}", location);
        self.last = Some(location);
    }

    /// Name handed to the utterance parser as disambiguation hint
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.last.as_ref().map(|location| location.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let memory = LocationMemory::new();
        assert!(memory.get().is_none());
        assert!(memory.hint().is_none());
    }

    #[test]
    fn test_set_overwrites_previous_location() {
        let mut memory = LocationMemory::new();
        memory.set(ResolvedLocation::new("Paris", 48.8534, 2.3488));
        memory.set(ResolvedLocation::new("Berlin", 52.5244, 13.4105));

        assert_eq!(memory.hint(), Some("Berlin"));
        assert_eq!(memory.get().unwrap().latitude, 52.5244);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut first = LocationMemory::new();
        let second = LocationMemory::new();
        first.set(ResolvedLocation::new("Paris", 48.8534, 2.3488));

        assert!(second.get().is_none());
    }
}
