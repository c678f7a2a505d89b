//! # DBus interface proxies
//!
//! The proxy follows the `org.freedesktop.Notifications` interface from the [Desktop Notifications
//! Specification](https://specifications.freedesktop.org/notification-spec/latest/protocol.html),
//! in the shape [zbus-xmlgen](https://docs.rs/crate/zbus_xmlgen/latest) generates.

mod dbus_notifications;
pub use dbus_notifications::*;
