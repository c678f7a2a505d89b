//! Client for the [freedesktop.org Desktop Notifications
//! protocol](https://specifications.freedesktop.org/notification-spec/latest/).
//!
//! [`Notifier`] sends and closes notifications and queries the server, [`Outcomes`] tracks what
//! happened to the notifications that were sent, and [`fallback`] drives `notify-send` for setups
//! without direct bus access.

pub mod dbus;
pub mod fallback;
pub mod names;

mod capabilities;
pub use capabilities::*;

mod error;
pub use error::*;

pub mod gateway;
pub use gateway::{Gateway, ZbusGateway};

mod hints;
pub use hints::*;

mod image;
pub use image::*;

mod notification;
pub use notification::*;

mod notifier;
pub use notifier::*;

mod outcome;
pub use outcome::*;

mod server_info;
pub use server_info::*;

mod signal;
pub use signal::*;
