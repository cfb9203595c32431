use crate::types::QueryDescriptor;

/// The live observe driver attached to a query, if any.
pub trait ObservationDriver {
    /// `Some(true)` when the driver is already tailing this exact query, `None` if it cannot say.
    fn supports_query(&self, query: &QueryDescriptor) -> Option<bool>;
}

/// Which driver a subscription ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    OplogTailing,
    Polling,
}

impl ObservationDriver for DriverKind {
    fn supports_query(&self, _query: &QueryDescriptor) -> Option<bool> {
        Some(matches!(self, Self::OplogTailing))
    }
}

impl<F> ObservationDriver for F
where
    F: Fn(&QueryDescriptor) -> Option<bool>,
{
    fn supports_query(&self, query: &QueryDescriptor) -> Option<bool> {
        self(query)
    }
}

impl std::str::FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "oplog" | "oplog-tailing" | "tailing" => Ok(Self::OplogTailing),
            "polling" | "poll" => Ok(Self::Polling),
            other => Err(format!("unknown driver kind: {other} (expected oplog|polling)")),
        }
    }
}
