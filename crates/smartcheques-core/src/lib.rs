pub mod capability;
pub mod constants;
pub mod error;
pub mod event;
pub mod types;

pub use capability::{cap, Principal};
pub use error::CoreError;
pub use event::{event_type, Event, EventPublisher, RecordingPublisher};
pub use types::{
    AlertId, ApproverId, ContractId, CurrencyCode, DisputeId, EnterpriseId, Money, MilestoneId,
    ObligationId, OracleProviderId, OracleRequestId, PartialPaymentId, RefundId, SmartChequeId,
    ThresholdId, Timestamp, TransactionId, UserId, WithdrawalRequestId,
};
