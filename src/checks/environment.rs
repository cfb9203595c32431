use crate::config::{CheckConfig, ENV_OPLOG_URL};
use crate::diagnosis::{ReasonCode, Verdict};

/// The deployment must have an oplog source configured.
pub fn env(config: &CheckConfig) -> Verdict {
    if config.has_oplog_source() {
        return Verdict::Eligible;
    }
    Verdict::fail(
        ReasonCode::NoEnv,
        "This app has no oplog source configured, so every observer falls back to polling.",
        format!("Set {ENV_OPLOG_URL} to the connection string of the replica set's local database."),
    )
}

/// Tailing support is only asserted for released builds.
pub fn git_checkout(config: &CheckConfig) -> Verdict {
    if config.official_release().is_some() {
        return Verdict::Eligible;
    }
    Verdict::fail(
        ReasonCode::GitCheckout,
        "The app is running from a source checkout without a release identifier, so oplog support cannot be confirmed.",
        "Run the app on an official release, or set OPLOGCHECK_RELEASE to the release it is built from.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_needs_oplog_url() {
        assert_eq!(env(&CheckConfig::default()).code(), Some(ReasonCode::NoEnv));
        assert!(env(&CheckConfig::default().with_oplog_url("mongodb://ssdsd")).is_eligible());
    }

    #[test]
    fn release_versus_checkout() {
        assert!(git_checkout(&CheckConfig::default().with_release("METEOR@0.7.1")).is_eligible());
        assert_eq!(git_checkout(&CheckConfig::default()).code(), Some(ReasonCode::GitCheckout));
    }
}
