//! Best-effort "match created" notifications.
//!
//! Generation operations hand created matches to a [`MatchNotifier`] after
//! their storage transaction commits. The notifier queues events on an mpsc
//! channel drained by a background task that delivers them through a
//! [`NotificationSink`], retrying a few times before dropping the event with
//! a log line. Delivery failures never surface to the caller and never roll
//! back structural changes.
//!
//! Broker settings live in an explicit [`NotifierConfig`] value; the engine
//! itself takes no dependency on it.

pub mod models;
pub mod publisher;

pub use models::{MatchCreated, NotifierConfig};
pub use publisher::{LogSink, MatchNotifier, NotificationSink, NotifyError};
