//! Completion futures
//!
//! [`TweenFuture`] resolves when an operation reaches a terminal state. The
//! scheduler resolves it synchronously, from inside the tick (or call) that
//! completes the operation, and wakes whichever task is polling it.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::driver::TweenStatus;

/// How an operation ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenOutcome {
    Succeeded,
    Cancelled,
}

impl TweenOutcome {
    pub(crate) fn from_status(status: TweenStatus) -> Self {
        match status {
            TweenStatus::Cancelled => TweenOutcome::Cancelled,
            _ => TweenOutcome::Succeeded,
        }
    }

    pub fn is_cancelled(self) -> bool {
        self == TweenOutcome::Cancelled
    }
}

/// Pollable status of a [`TweenFuture`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionStatus {
    Pending,
    Succeeded,
    Cancelled,
}

impl From<TweenOutcome> for CompletionStatus {
    fn from(outcome: TweenOutcome) -> Self {
        match outcome {
            TweenOutcome::Succeeded => CompletionStatus::Succeeded,
            TweenOutcome::Cancelled => CompletionStatus::Cancelled,
        }
    }
}

#[derive(Default)]
struct CompletionSlot {
    outcome: Option<TweenOutcome>,
    waker: Option<Waker>,
}

/// Future resolving to an operation's [`TweenOutcome`]
///
/// Clones share the same completion.
///
/// ```ignore
/// let outcome = op.completion(&scheduler).await;
/// if outcome.is_cancelled() {
///     return;
/// }
/// ```
#[derive(Clone)]
#[must_use = "futures do nothing unless polled"]
pub struct TweenFuture {
    slot: Rc<RefCell<CompletionSlot>>,
}

impl TweenFuture {
    /// A future that is already resolved
    pub fn ready(outcome: TweenOutcome) -> Self {
        Self {
            slot: Rc::new(RefCell::new(CompletionSlot {
                outcome: Some(outcome),
                waker: None,
            })),
        }
    }

    /// A pending future and the continuation that resolves it
    pub(crate) fn pending() -> (Self, impl FnOnce(TweenOutcome) + 'static) {
        let slot = Rc::new(RefCell::new(CompletionSlot::default()));
        let resolver = slot.clone();
        let resolve = move |outcome: TweenOutcome| {
            let waker = {
                let mut slot = resolver.borrow_mut();
                slot.outcome = Some(outcome);
                slot.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake();
            }
        };
        (Self { slot }, resolve)
    }

    pub fn status(&self) -> CompletionStatus {
        match self.slot.borrow().outcome {
            Some(outcome) => outcome.into(),
            None => CompletionStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status() == CompletionStatus::Pending
    }

    /// The outcome, if resolved
    pub fn outcome(&self) -> Option<TweenOutcome> {
        self.slot.borrow().outcome
    }
}

impl Future for TweenFuture {
    type Output = TweenOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        match slot.outcome {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn test_ready_future() {
        let future = TweenFuture::ready(TweenOutcome::Cancelled);
        assert_eq!(future.status(), CompletionStatus::Cancelled);
        assert_eq!(future.now_or_never(), Some(TweenOutcome::Cancelled));
    }

    #[test]
    fn test_pending_resolves() {
        let (future, resolve) = TweenFuture::pending();
        assert!(future.is_pending());
        assert_eq!(future.clone().now_or_never(), None);

        resolve(TweenOutcome::Succeeded);
        assert_eq!(future.status(), CompletionStatus::Succeeded);
        assert_eq!(future.now_or_never(), Some(TweenOutcome::Succeeded));
    }
}
