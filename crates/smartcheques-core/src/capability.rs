use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Canonical capability strings checked at authorization seams. Collected
/// here for the same reason `event_type` is: one typo shouldn't let a check
/// and a grant silently diverge across crates.
pub mod cap {
    pub const WITHDRAWAL_INITIATE: &str = "withdrawal.initiate";
    pub const WITHDRAWAL_APPROVE: &str = "withdrawal.approve";
    pub const WITHDRAWAL_RELEASE_PRIVILEGED: &str = "withdrawal.release_privileged";
}

/// A caller's identity plus the capability grants it is presenting for a
/// single call. An embedding REST layer resolves a bearer `auth_token` into
/// a `Principal` before calling into a subsystem; token verification itself
/// is out of scope here, same as JWT issuance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub capabilities: HashSet<String>,
}

impl Principal {
    pub fn new(user_id: UserId, capabilities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { user_id, capabilities: capabilities.into_iter().map(Into::into).collect() }
    }

    pub fn has(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_capability_is_not_held() {
        let principal = Principal::new(UserId::new(), [cap::WITHDRAWAL_INITIATE]);
        assert!(principal.has(cap::WITHDRAWAL_INITIATE));
        assert!(!principal.has(cap::WITHDRAWAL_APPROVE));
    }
}
