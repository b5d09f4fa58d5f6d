//! Futures that resolve when a state is entered.

use super::error::MachineError;
use super::notify::{ListenerId, Notifier};
use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Resolves once a state is entered, or right away with the outcome already
/// known when it was created.
///
/// Returned by [`StatefulMachine::wait_for_enter_state`] and
/// [`StatefulMachine::wait_for_state`].
///
/// [`StatefulMachine::wait_for_enter_state`]: crate::runtime::StatefulMachine::wait_for_enter_state
/// [`StatefulMachine::wait_for_state`]: crate::runtime::StatefulMachine::wait_for_state
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct StateWait {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Done(Option<Result<(), MachineError>>),
    Pending {
        state: String,
        entered: oneshot::Receiver<()>,
        listener: Option<Subscription>,
    },
}

/// Removes the entry listener of a wait that is dropped before it fires.
#[derive(Debug)]
struct Subscription {
    notifier: Weak<Notifier>,
    id: ListenerId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(notifier) = self.notifier.upgrade() {
            notifier.off(self.id);
        }
    }
}

impl StateWait {
    pub(crate) fn ready() -> Self {
        Self {
            inner: Inner::Done(Some(Ok(()))),
        }
    }

    pub(crate) fn failed(error: MachineError) -> Self {
        Self {
            inner: Inner::Done(Some(Err(error))),
        }
    }

    pub(crate) fn pending(state: String, entered: oneshot::Receiver<()>) -> Self {
        Self {
            inner: Inner::Pending {
                state,
                entered,
                listener: None,
            },
        }
    }

    /// Unsubscribe listener `id` from `notifier` when this wait is dropped.
    pub(crate) fn unsubscribing(mut self, notifier: Weak<Notifier>, id: ListenerId) -> Self {
        if let Inner::Pending { listener, .. } = &mut self.inner {
            *listener = Some(Subscription { notifier, id });
        }
        self
    }
}

impl Future for StateWait {
    type Output = Result<(), MachineError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Inner::Done(outcome) => Poll::Ready(outcome.take().unwrap_or(Ok(()))),
            Inner::Pending { state, entered, .. } => match Pin::new(entered).poll(cx) {
                Poll::Ready(Ok(())) => Poll::Ready(Ok(())),
                Poll::Ready(Err(_)) => Poll::Ready(Err(MachineError::Closed {
                    state: state.clone(),
                })),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::notify::StateEvent;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn ready_wait_resolves_immediately() {
        assert_eq!(StateWait::ready().await, Ok(()));
    }

    #[tokio::test]
    async fn failed_wait_reports_error() {
        let error = MachineError::NoSuchState {
            state: "nope".to_string(),
        };
        assert_eq!(StateWait::failed(error.clone()).await, Err(error));
    }

    #[tokio::test]
    async fn pending_wait_resolves_on_signal() {
        let (tx, rx) = oneshot::channel();
        let mut wait = StateWait::pending("A".to_string(), rx);

        let early = tokio::time::timeout(Duration::from_millis(20), &mut wait).await;
        assert!(early.is_err());

        tx.send(()).unwrap();
        assert_eq!(wait.await, Ok(()));
    }

    #[test]
    fn dropped_wait_unsubscribes() {
        let notifier = Arc::new(Notifier::new());
        let event = StateEvent::enter("A");
        let id = notifier.once(event.clone(), |_| {});
        let (_tx, rx) = oneshot::channel();

        let wait =
            StateWait::pending("A".to_string(), rx).unsubscribing(Arc::downgrade(&notifier), id);
        assert_eq!(notifier.listener_count(&event), 1);
        drop(wait);
        assert_eq!(notifier.listener_count(&event), 0);
    }

    #[tokio::test]
    async fn dropped_sender_closes_wait() {
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);
        assert_eq!(
            StateWait::pending("A".to_string(), rx).await,
            Err(MachineError::Closed {
                state: "A".to_string()
            })
        );
    }
}
