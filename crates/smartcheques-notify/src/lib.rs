pub mod connection;
pub mod engine;
pub mod error;
pub mod history;
pub mod notification;
pub mod throttle;
pub mod transport;

pub use engine::NotificationFabric;
pub use error::NotifyError;
pub use notification::Notification;
pub use transport::{EmailTransport, NoopEmailTransport, NoopWebhookTransport, SentEmail, SentWebhook, WebhookTransport};
