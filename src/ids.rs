use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::event::RawEvent;

/// Header a caller can use to pin the dispatch id for log correlation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-dispatch identifier backed by ULID, recorded on the dispatch span.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct DispatchId(pub ulid::Ulid);

impl DispatchId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse the event's `x-request-id` header when it holds a ULID,
    /// otherwise generate a fresh id.
    #[must_use]
    pub fn from_event_or_new(event: &RawEvent) -> Self {
        event
            .header(REQUEST_ID_HEADER)
            .and_then(|s| s.parse::<DispatchId>().ok())
            .unwrap_or_default()
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DispatchId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DispatchId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(DispatchId)
    }
}
