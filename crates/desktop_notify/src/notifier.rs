use std::sync::Arc;

use crate::{
    gateway::{MethodCall, Reply},
    *,
};

/// Client for the session's notification server.
///
/// Cloning is cheap, and every method can be called concurrently; each one is an independent
/// request/reply on the shared connection. No timeouts are applied here, wrap calls in
/// [`tokio::time::timeout`] if needed.
#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn Gateway>,
}

impl Notifier {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Connect to the notification server on the session bus.
    pub async fn session() -> Result<Self> {
        Ok(Self::new(Arc::new(ZbusGateway::session().await?)))
    }

    pub async fn on_connection(con: &zbus::Connection) -> Result<Self> {
        Ok(Self::new(Arc::new(ZbusGateway::new(con).await?)))
    }

    /// The capability strings exactly as the server reported them.
    pub async fn raw_capabilities(&self) -> Result<Vec<String>> {
        match self.gateway.call(MethodCall::GetCapabilities).await? {
            Reply::Strings(names) => Ok(names),
            Reply::Empty => Ok(Vec::new()),
            other => Err(unexpected_reply("GetCapabilities", &other)),
        }
    }

    pub async fn capabilities(&self) -> Result<Capabilities> {
        Ok(Capabilities::from_names(self.raw_capabilities().await?))
    }

    pub async fn server_information(&self) -> Result<ServerInformation> {
        match self.gateway.call(MethodCall::GetServerInformation).await? {
            Reply::Strings(fields) => ServerInformation::from_fields(fields),
            other => Err(unexpected_reply("GetServerInformation", &other)),
        }
    }

    /// Show the notification, returning the id the server assigned to it.
    ///
    /// Every call is a new `Notify` exchange; nothing is deduplicated here.
    pub async fn send(&self, notification: &Notification) -> Result<u32> {
        let args = notification.to_notify_args();
        match self.gateway.call(MethodCall::Notify(args)).await? {
            Reply::Id(id) => {
                log::debug!("notification {:?} got id {}", notification.summary, id);
                Ok(id)
            }
            other => Err(unexpected_reply("Notify", &other)),
        }
    }

    /// Send the notification and register interest in its outcome.
    ///
    /// Signals that arrive before the id is registered are missed, so very short timeouts may
    /// never resolve.
    pub async fn send_and_track(&self, notification: &Notification, outcomes: &Outcomes) -> Result<Interest> {
        let id = self.send(notification).await?;
        Ok(outcomes.register(id))
    }

    /// Close a notification. What happens for ids the server already closed is up to the server.
    pub async fn close(&self, id: u32) -> Result<()> {
        self.gateway.call(MethodCall::CloseNotification(id)).await?;
        Ok(())
    }

    /// Subscribe to the server's signals. See [`Outcomes`].
    pub async fn outcomes(&self) -> Result<Outcomes> {
        let stream = self.gateway.subscribe().await?;
        Ok(Outcomes::new(stream))
    }
}

fn unexpected_reply(member: &str, reply: &Reply) -> Error {
    Error::Decode(format!("unexpected reply to {}: {:?}", member, reply))
}
