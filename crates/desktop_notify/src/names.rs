//! Well-known names of the `org.freedesktop.Notifications` service, plus the reserved hint keys and
//! standard categories from the [Desktop Notifications Specification].
//!
//! [Desktop Notifications Specification]: https://specifications.freedesktop.org/notification-spec/latest/

pub const NOTIFICATIONS_BUS: &str = "org.freedesktop.Notifications";
pub const NOTIFICATIONS_OBJECT: &str = "/org/freedesktop/Notifications";
pub const NOTIFICATIONS_INTERFACE: &str = "org.freedesktop.Notifications";

pub mod hint {
    pub const ACTION_ICONS: &str = "action-icons";
    pub const CATEGORY: &str = "category";
    pub const DESKTOP_ENTRY: &str = "desktop-entry";
    pub const IMAGE_DATA: &str = "image-data";
    pub const IMAGE_PATH: &str = "image-path";
    pub const RESIDENT: &str = "resident";
    pub const SOUND_FILE: &str = "sound-file";
    pub const SOUND_NAME: &str = "sound-name";
    pub const SUPPRESS_SOUND: &str = "suppress-sound";
    pub const TRANSIENT: &str = "transient";
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const URGENCY: &str = "urgency";
}

/// Standard notification categories, passed in the `category` hint.
pub mod category {
    pub const DEVICE: &str = "device";
    pub const DEVICE_ADDED: &str = "device.added";
    pub const DEVICE_ERROR: &str = "device.error";
    pub const DEVICE_REMOVED: &str = "device.removed";
    pub const EMAIL: &str = "email";
    pub const EMAIL_ARRIVED: &str = "email.arrived";
    pub const EMAIL_BOUNCED: &str = "email.bounced";
    pub const IM: &str = "im";
    pub const IM_ERROR: &str = "im.error";
    pub const IM_RECEIVED: &str = "im.received";
    pub const NETWORK: &str = "network";
    pub const NETWORK_CONNECTED: &str = "network.connected";
    pub const NETWORK_DISCONNECTED: &str = "network.disconnected";
    pub const NETWORK_ERROR: &str = "network.error";
    pub const PRESENCE: &str = "presence";
    pub const PRESENCE_OFFLINE: &str = "presence.offline";
    pub const PRESENCE_ONLINE: &str = "presence.online";
    pub const TRANSFER: &str = "transfer";
    pub const TRANSFER_COMPLETE: &str = "transfer.complete";
    pub const TRANSFER_ERROR: &str = "transfer.error";
}
