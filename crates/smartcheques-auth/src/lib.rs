pub mod engine;
pub mod error;
pub mod risk;
pub mod store;
pub mod withdrawal;

pub use engine::{ApprovalConfig, AuthEngine, BulkApprovalOutcome, RiskProfile};
pub use error::AuthError;
pub use risk::{assess, RiskInput, RiskLevel, RiskScore};
pub use store::{AuthStore, InMemoryAuthStore};
pub use withdrawal::{ApprovalRecord, ApprovalType, WithdrawalAuthorization, WithdrawalStatus};
