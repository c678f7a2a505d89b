use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use futures::{Stream, StreamExt};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::{gateway::SignalStream, *};

/// Demultiplexes the server's broadcast signals into one outcome per notification id.
///
/// A single subscription is shared by every registered [`Interest`]. Each interest resolves with
/// the first `ActionInvoked` or `NotificationClosed` signal for its id; signals for ids nobody
/// registered (e.g. notifications of other applications) are dropped.
///
/// Register an id as soon as `Notify` returns it, signals that arrive before that are not kept.
/// Dropping the `Outcomes` stops the subscription and cancels all interests.
pub struct Outcomes {
    registry: Arc<Registry>,
    token: CancellationToken,
}

/// Interest in the outcome of a single notification.
#[must_use = "an Interest is cancelled when dropped"]
pub struct Interest {
    id: u32,
    key: u64,
    rx: oneshot::Receiver<Result<Signal>>,
    registry: Arc<Registry>,
    token: CancellationToken,
}

/// Detached handle that can cancel an [`Interest`] from elsewhere.
#[derive(Clone)]
pub struct CancelHandle {
    id: u32,
    key: u64,
    registry: Arc<Registry>,
    token: CancellationToken,
}

#[derive(Default)]
struct Registry {
    state: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    slots: HashMap<u32, Slot>,
    next_key: u64,
    /// Set once the subscription has failed. Later registrations resolve with this right away.
    failure: Option<Error>,
}

struct Slot {
    key: u64,
    tx: oneshot::Sender<Result<Signal>>,
}

impl Outcomes {
    /// Start demultiplexing `stream` on a background task. Must be called within a tokio runtime.
    pub fn new(stream: SignalStream) -> Self {
        Self::with_cancellation(stream, &CancellationToken::new())
    }

    /// Like [`Outcomes::new`], but also stops when `parent` is cancelled.
    pub fn with_cancellation(stream: SignalStream, parent: &CancellationToken) -> Self {
        let registry = Arc::new(Registry::default());
        let token = parent.child_token();
        tokio::spawn(run(stream, registry.clone(), token.clone()));
        Self { registry, token }
    }

    pub fn register(&self, id: u32) -> Interest {
        let (tx, rx) = oneshot::channel();
        let mut state = self.registry.state.lock().unwrap(); // unwrap: mutex poisoning is okay
        state.next_key += 1;
        let key = state.next_key;

        if let Some(err) = state.failure.clone() {
            let _ = tx.send(Err(err));
        } else if state.slots.insert(id, Slot { key, tx }).is_some() {
            log::warn!("notification {} was registered twice, dropping the older interest", id);
        } else {
            log::debug!("waiting for outcome of notification {}", id);
        }

        Interest { id, key, rx, registry: self.registry.clone(), token: self.token.child_token() }
    }

    /// Number of registered interests that have not been resolved or cancelled yet.
    pub fn pending(&self) -> usize {
        self.registry.state.lock().unwrap().slots.len() // unwrap: mutex poisoning is okay
    }

    /// Stop the subscription. Every pending interest resolves as cancelled.
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

impl Drop for Outcomes {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run(mut stream: SignalStream, registry: Arc<Registry>, token: CancellationToken) {
    let failure = loop {
        let ev = tokio::select! {
            biased;
            _ = token.cancelled() => {
                log::debug!("notification signal subscription cancelled");
                return;
            }
            ev = stream.next() => ev,
        };

        match ev {
            Some(Ok(signal)) => registry.deliver(signal),
            Some(Err(Error::Decode(msg))) => log::warn!("skipping malformed notification signal: {}", msg),
            Some(Err(err)) => break err,
            None => break Error::ConnectionClosed,
        }
    };

    log::debug!("notification signal subscription ended: {}", failure);
    registry.fail(failure);
}

impl Registry {
    fn deliver(&self, signal: Signal) {
        let id = signal.id();
        let mut state = self.state.lock().unwrap(); // unwrap: mutex poisoning is okay
        match state.slots.remove(&id) {
            Some(slot) => {
                if slot.tx.send(Ok(signal)).is_err() {
                    log::trace!("interest in notification {} went away before its outcome arrived", id);
                }
            }
            None => log::trace!("ignoring {:?}, nobody is waiting for it", signal),
        }
    }

    fn fail(&self, err: Error) {
        let mut state = self.state.lock().unwrap(); // unwrap: mutex poisoning is okay
        for (_, slot) in state.slots.drain() {
            let _ = slot.tx.send(Err(err.clone()));
        }
        state.failure = Some(err);
    }

    fn remove(&self, id: u32, key: u64) {
        let mut state = self.state.lock().unwrap(); // unwrap: mutex poisoning is okay
        // the id may have been registered again in the meantime
        if state.slots.get(&id).map(|slot| slot.key) == Some(key) {
            state.slots.remove(&id);
        }
    }
}

impl Interest {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Withdraw interest. Idempotent, and doesn't affect any other id.
    pub fn cancel(&self) {
        self.token.cancel();
        self.registry.remove(self.id, self.key);
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle { id: self.id, key: self.key, registry: self.registry.clone(), token: self.token.clone() }
    }

    /// Wait for the outcome.
    ///
    /// Returns `None` if the interest was cancelled, either directly or by shutting down the
    /// [`Outcomes`] it came from. Returns an error if the subscription failed before a matching
    /// signal arrived.
    ///
    /// An outcome that was delivered before the cancellation is still returned.
    pub async fn wait(mut self) -> Option<Result<Signal>> {
        tokio::select! {
            biased;
            res = &mut self.rx => res.ok(),
            _ = self.token.cancelled() => None,
        }
    }

    /// The outcome as a stream of at most one item, ending without an item when cancelled.
    pub fn into_stream(self) -> impl Stream<Item = Result<Signal>> {
        futures::stream::once(self.wait()).filter_map(futures::future::ready)
    }
}

impl Drop for Interest {
    fn drop(&mut self) {
        self.rx.close();
        self.registry.remove(self.id, self.key);
    }
}

impl CancelHandle {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
        self.registry.remove(self.id, self.key);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::channel::mpsc;
    use pretty_assertions::assert_eq;

    fn outcomes() -> (Outcomes, mpsc::UnboundedSender<Result<Signal>>) {
        let (tx, rx) = mpsc::unbounded();
        (Outcomes::new(rx.boxed()), tx)
    }

    fn invoked(id: u32, key: &str) -> Result<Signal> {
        Ok(Signal::ActionInvoked { id, action_key: key.to_string() })
    }

    fn closed(id: u32, reason: u32) -> Result<Signal> {
        Ok(Signal::NotificationClosed { id, reason: reason.into() })
    }

    #[tokio::test]
    async fn test_demultiplex_by_id() {
        let (outcomes, tx) = outcomes();
        let five = outcomes.register(5);
        let seven = outcomes.register(7);
        assert_eq!(outcomes.pending(), 2);

        tx.unbounded_send(invoked(5, "ok")).unwrap();
        tx.unbounded_send(closed(7, 2)).unwrap();
        tx.unbounded_send(closed(5, 1)).unwrap();

        let five = five.wait().await.unwrap().unwrap();
        let seven = seven.wait().await.unwrap().unwrap();
        assert_eq!(five, Signal::ActionInvoked { id: 5, action_key: "ok".to_string() });
        assert_eq!(seven, Signal::NotificationClosed { id: 7, reason: CloseReason::Dismissed });
        assert_eq!(outcomes.pending(), 0);
    }

    #[tokio::test]
    async fn test_first_match_is_terminal() {
        let (outcomes, tx) = outcomes();
        let stream = outcomes.register(5).into_stream();

        tx.unbounded_send(invoked(5, "ok")).unwrap();
        tx.unbounded_send(closed(5, 1)).unwrap();

        let seen: Vec<Signal> = stream.map(|x| x.unwrap()).collect().await;
        assert_eq!(seen, vec![Signal::ActionInvoked { id: 5, action_key: "ok".to_string() }]);
    }

    #[tokio::test]
    async fn test_cancel_before_signal() {
        let (outcomes, tx) = outcomes();
        let five = outcomes.register(5);
        five.cancel();
        five.cancel();
        tx.unbounded_send(invoked(5, "ok")).unwrap();

        let mut handled = 0;
        let mut stream = Box::pin(five.into_stream());
        while let Some(outcome) = stream.next().await {
            outcome.unwrap();
            handled += 1;
        }
        assert_eq!(handled, 0);
        assert_eq!(outcomes.pending(), 0);
    }

    #[tokio::test]
    async fn test_cancel_leaves_other_ids_alone() {
        let (outcomes, tx) = outcomes();
        let one = outcomes.register(1);
        let two = outcomes.register(2);

        let handle = one.cancel_handle();
        handle.cancel();
        handle.cancel();

        tx.unbounded_send(closed(1, 3)).unwrap();
        tx.unbounded_send(closed(2, 3)).unwrap();

        assert!(one.wait().await.is_none());
        assert_eq!(two.wait().await.unwrap().unwrap(), Signal::NotificationClosed { id: 2, reason: CloseReason::CloseCalled });
    }

    async fn wait_until_delivered(outcomes: &Outcomes) {
        while outcomes.pending() > 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_cancel_after_resolve_keeps_outcome() {
        let (outcomes, tx) = outcomes();
        let five = outcomes.register(5);
        tx.unbounded_send(closed(5, 2)).unwrap();
        wait_until_delivered(&outcomes).await;

        five.cancel();
        five.cancel_handle().cancel();
        assert_eq!(five.wait().await.unwrap().unwrap(), Signal::NotificationClosed { id: 5, reason: CloseReason::Dismissed });
    }

    #[tokio::test]
    async fn test_shutdown_after_resolve_keeps_outcome() {
        let (outcomes, tx) = outcomes();
        let five = outcomes.register(5);
        let six = outcomes.register(6);
        tx.unbounded_send(invoked(5, "ok")).unwrap();
        while outcomes.pending() > 1 {
            tokio::task::yield_now().await;
        }

        drop(outcomes);
        assert_eq!(five.wait().await.unwrap().unwrap(), Signal::ActionInvoked { id: 5, action_key: "ok".to_string() });
        assert!(six.wait().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_interest_is_deregistered() {
        let (outcomes, _tx) = outcomes();
        drop(outcomes.register(3));
        assert_eq!(outcomes.pending(), 0);
    }

    #[tokio::test]
    async fn test_end_of_stream_fails_pending() {
        let (outcomes, tx) = outcomes();
        let pending = outcomes.register(11);
        drop(tx);

        assert!(matches!(pending.wait().await, Some(Err(Error::ConnectionClosed))));
        assert!(matches!(outcomes.register(12).wait().await, Some(Err(Error::ConnectionClosed))));
    }

    #[tokio::test]
    async fn test_connection_error_fails_pending() {
        let (outcomes, tx) = outcomes();
        let a = outcomes.register(1);
        let b = outcomes.register(2);
        let err = Error::Connection(Arc::new(zbus::Error::Failure("bus went away".to_string())));
        tx.unbounded_send(Err(err)).unwrap();

        assert!(matches!(a.wait().await, Some(Err(Error::Connection(_)))));
        assert!(matches!(b.wait().await, Some(Err(Error::Connection(_)))));
    }

    #[tokio::test]
    async fn test_malformed_signal_is_skipped() {
        let (outcomes, tx) = outcomes();
        let interest = outcomes.register(4);
        tx.unbounded_send(Err(Error::Decode("bad args".to_string()))).unwrap();
        tx.unbounded_send(closed(4, 1)).unwrap();

        assert_eq!(interest.wait().await.unwrap().unwrap(), Signal::NotificationClosed { id: 4, reason: CloseReason::Expired });
    }

    #[tokio::test]
    async fn test_shutdown_cancels_interests() {
        let parent = CancellationToken::new();
        let (_tx, rx) = mpsc::unbounded();
        let outcomes = Outcomes::with_cancellation(rx.boxed(), &parent);
        let interest = outcomes.register(6);

        parent.cancel();
        assert!(interest.wait().await.is_none());

        let late = outcomes.register(7);
        drop(outcomes);
        assert!(late.wait().await.is_none());
    }

    #[tokio::test]
    async fn test_notifier_outcomes_use_gateway_subscription() {
        let (gateway, tx) = crate::gateway::test_util::ScriptedGateway::with_signals();
        let notifier = Notifier::new(gateway);
        let outcomes = notifier.outcomes().await.unwrap();
        let interest = outcomes.register(21);

        tx.unbounded_send(invoked(99, "default")).unwrap();
        tx.unbounded_send(invoked(21, "default")).unwrap();
        assert_eq!(interest.wait().await.unwrap().unwrap(), Signal::ActionInvoked { id: 21, action_key: "default".to_string() });
    }
}
