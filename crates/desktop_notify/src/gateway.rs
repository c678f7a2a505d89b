use std::collections::HashMap;

use futures::{
    future::BoxFuture,
    stream::{BoxStream, StreamExt},
    FutureExt,
};
use zbus::{
    export::ordered_stream::{self, OrderedStream, OrderedStreamExt},
    zvariant::Value,
};

use crate::*;

/// Signals of the notification interface, in the order the bus delivered them.
pub type SignalStream = BoxStream<'static, Result<Signal>>;

/// A procedure call on the `org.freedesktop.Notifications` interface.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodCall {
    GetCapabilities,
    GetServerInformation,
    Notify(NotifyArgs),
    CloseNotification(u32),
}

impl MethodCall {
    pub fn member(&self) -> &'static str {
        match self {
            MethodCall::GetCapabilities => "GetCapabilities",
            MethodCall::GetServerInformation => "GetServerInformation",
            MethodCall::Notify(_) => "Notify",
            MethodCall::CloseNotification(_) => "CloseNotification",
        }
    }
}

/// The positional arguments of `Notify`, already in wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyArgs {
    pub app_name: String,
    pub replaces_id: u32,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    /// Alternating action ids and labels.
    pub actions: Vec<String>,
    pub hints: HashMap<String, Value<'static>>,
    pub expire_timeout: i32,
}

/// The body of a method reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Empty,
    Id(u32),
    Strings(Vec<String>),
}

/// What the notification client needs from a message bus: issue a call and wait for its reply, and
/// subscribe to the signals of the notification interface.
///
/// Implementations must be usable from many concurrent callers at once.
pub trait Gateway: Send + Sync {
    fn call(&self, call: MethodCall) -> BoxFuture<'_, Result<Reply>>;

    /// Subscribe to both `ActionInvoked` and `NotificationClosed`. The stream ends when the
    /// connection goes away.
    fn subscribe(&self) -> BoxFuture<'_, Result<SignalStream>>;
}

/// [`Gateway`] over a zbus connection to the session bus.
#[derive(Clone)]
pub struct ZbusGateway {
    proxy: dbus::NotificationsProxy<'static>,
}

impl ZbusGateway {
    pub async fn new(con: &zbus::Connection) -> Result<Self> {
        let proxy = dbus::NotificationsProxy::new(con).await?;
        Ok(Self { proxy })
    }

    /// Open a connection to the session bus.
    pub async fn session() -> Result<Self> {
        let con = zbus::Connection::session().await.map_err(|e| Error::Connection(std::sync::Arc::new(e)))?;
        Self::new(&con).await
    }

    pub fn connection(&self) -> &zbus::Connection {
        self.proxy.connection()
    }

    async fn do_call(&self, call: MethodCall) -> Result<Reply> {
        log::debug!("calling {}.{}", names::NOTIFICATIONS_INTERFACE, call.member());
        let reply = match call {
            MethodCall::GetCapabilities => Reply::Strings(self.proxy.get_capabilities().await?),
            MethodCall::GetServerInformation => {
                let (name, vendor, version, spec_version) = self.proxy.get_server_information().await?;
                Reply::Strings(vec![name, vendor, version, spec_version])
            }
            MethodCall::Notify(args) => Reply::Id(
                self.proxy
                    .notify(
                        &args.app_name,
                        args.replaces_id,
                        &args.app_icon,
                        &args.summary,
                        &args.body,
                        &args.actions,
                        &args.hints,
                        args.expire_timeout,
                    )
                    .await?,
            ),
            MethodCall::CloseNotification(id) => {
                self.proxy.close_notification(id).await?;
                Reply::Empty
            }
        };
        Ok(reply)
    }

    async fn do_subscribe(&self) -> Result<SignalStream> {
        let invoked = self.proxy.receive_action_invoked().await?;
        let closed = self.proxy.receive_notification_closed().await?;

        // join the two streams by message serial, so they stay in bus order relative to each other
        let ev_stream = ordered_stream::join(
            OrderedStreamExt::map(invoked, |sig| -> zbus::Result<Signal> {
                let args = sig.args()?;
                Ok(Signal::ActionInvoked { id: args.id, action_key: args.action_key.to_owned() })
            }),
            OrderedStreamExt::map(closed, |sig| -> zbus::Result<Signal> {
                let args = sig.args()?;
                Ok(Signal::NotificationClosed { id: args.id, reason: args.reason.into() })
            }),
        );
        Ok(into_signal_stream(ev_stream))
    }
}

/// The match rules live as long as the signal streams, so whoever holds the returned stream owns
/// the subscription.
fn into_signal_stream<S>(ev_stream: S) -> SignalStream
where
    S: OrderedStream<Data = zbus::Result<Signal>> + Send + 'static,
{
    StreamExt::boxed(StreamExt::map(OrderedStreamExt::into_stream(ev_stream), |ev| ev.map_err(Error::from)))
}

impl Gateway for ZbusGateway {
    fn call(&self, call: MethodCall) -> BoxFuture<'_, Result<Reply>> {
        self.do_call(call).boxed()
    }

    fn subscribe(&self) -> BoxFuture<'_, Result<SignalStream>> {
        self.do_subscribe().boxed()
    }
}
