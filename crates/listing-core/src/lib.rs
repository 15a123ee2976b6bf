#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for invalidation channel operations.
pub const TRACING_TARGET_CHANNEL: &str = "listing_core::channel";

/// Tracing target for user-facing notifications.
pub const TRACING_TARGET_NOTIFY: &str = "listing_core::notify";

pub mod channel;
mod error;
mod mapper;
pub mod notification;
pub mod service;
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result, UNEXPECTED_ERROR};
pub use mapper::{format_size, map_file, map_files};
pub use notification::{Notification, NotificationSink, Severity, TracingSink};
