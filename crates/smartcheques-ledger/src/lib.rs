pub mod asset;
pub mod balance;
pub mod engine;
pub mod error;
pub mod store;

pub use asset::{AssetClass, SupportedAsset};
pub use balance::{
    apply_delta, AssetTransaction, ConsistencyReport, EnterpriseBalance, LedgerOpRequest,
    OperationType, TransactionStatus,
};
pub use engine::LedgerEngine;
pub use error::LedgerError;
pub use store::{InMemoryLedgerStore, LedgerStore};
