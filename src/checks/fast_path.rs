use crate::diagnosis::{ReasonCode, Verdict};
use crate::driver::ObservationDriver;
use crate::types::QueryDescriptor;

/// A driver that is already tailing the query settles the question.
pub fn driver_supported(query: &QueryDescriptor, driver: Option<&dyn ObservationDriver>) -> Verdict {
    match driver.and_then(|d| d.supports_query(query)) {
        Some(true) => Verdict::fail(
            ReasonCode::OplogSupported,
            "The active observe driver is tailing the oplog for this query.",
            "Nothing to change. If updates still look slow, check the oplog source's replication lag.",
        ),
        _ => Verdict::Eligible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverKind;

    #[test]
    fn only_a_confirming_driver_short_circuits() {
        let q = QueryDescriptor::default();
        assert_eq!(
            driver_supported(&q, Some(&DriverKind::OplogTailing)).code(),
            Some(ReasonCode::OplogSupported)
        );
        assert!(driver_supported(&q, Some(&DriverKind::Polling)).is_eligible());
        assert!(driver_supported(&q, None).is_eligible());
        let unknown = |_: &QueryDescriptor| -> Option<bool> { None };
        assert!(driver_supported(&q, Some(&unknown)).is_eligible());
    }
}
