/// Why the server closed a notification, from the `NotificationClosed` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// The notification expired.
    Expired,
    /// The notification was dismissed by the user.
    Dismissed,
    /// The notification was closed by a call to `CloseNotification`.
    CloseCalled,
    /// Undefined or reserved reasons.
    Undefined,
}

impl From<u32> for CloseReason {
    fn from(reason: u32) -> Self {
        match reason {
            1 => CloseReason::Expired,
            2 => CloseReason::Dismissed,
            3 => CloseReason::CloseCalled,
            _ => CloseReason::Undefined,
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CloseReason::Expired => "expired",
            CloseReason::Dismissed => "dismissed",
            CloseReason::CloseCalled => "closed",
            CloseReason::Undefined => "undefined",
        })
    }
}

/// A signal emitted by the notification server about one of the notifications on the bus.
///
/// Signals are broadcast, so these arrive for every client's notifications, not just ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    ActionInvoked { id: u32, action_key: String },
    NotificationClosed { id: u32, reason: CloseReason },
}

impl Signal {
    pub fn id(&self) -> u32 {
        match self {
            Signal::ActionInvoked { id, .. } | Signal::NotificationClosed { id, .. } => *id,
        }
    }
}
