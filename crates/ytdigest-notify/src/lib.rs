//! Telegram delivery for summary messages.
//!
//! - [`split`]: bound message size
//! - [`client`]: Bot API client behind the [`MessageSender`] seam
//! - [`retry_queue`]: background redelivery of failed chunks
//! - [`dispatcher`]: ties the above together per message

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod retry_queue;
pub mod split;

pub use client::{MessageSender, TelegramClient, TelegramConfig};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{NotifyError, NotifyResult};
pub use retry_queue::{RetryQueue, RetryQueueConfig};
pub use split::{split_message, split_message_with_limit, MAX_MESSAGE_LENGTH};
