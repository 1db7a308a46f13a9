pub mod dispute;
pub mod engine;
pub mod error;
pub mod refund;
pub mod store;
pub mod strategy;

pub use dispute::{Dispute, DisputeStatus, EvidenceItem, Priority};
pub use engine::DisputeEngine;
pub use error::DisputeError;
pub use refund::{can_transition, PartialPayment, RecordStatus, Refund, RefundType};
pub use store::{DisputeStore, InMemoryDisputeStore};
pub use strategy::{route, Candidate, DisputeRoutingInput, HistoricalPerformance, ResolutionMethod, RoutingDecision};
