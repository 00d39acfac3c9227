//! Services
//!
//! Cross-cutting application services: the TTL read cache, the payment
//! gateway client, outbound mail, the pending registration store, and the
//! order lifecycle controller.

pub mod cache;
pub mod gateway;
pub mod mailer;
pub mod payment;
pub mod registration;

pub use cache::CacheService;
pub use gateway::{PaymentGateway, PaystackClient};
pub use mailer::{HttpMailer, LogMailer, Mailer};
pub use payment::PaymentService;
pub use registration::PendingStore;
