use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::errors::LocoError;
use crate::response::Response;

/// Handle to an in-flight call, returned immediately by
/// [`Client::request`](crate::client::Client::request) and the verb shorthands.
///
/// It is a [`Future`] resolving to the final [`Response`], so async code simply `.await`s it.
/// Synchronous code calls [`ResponseHandle::wait`]. Either way the result is always a
/// `Response`: failures, including a call that could not be started, are reported through
/// `error_message`.
///
/// Dropping the handle does not cancel the call; only the request's timeouts do.
#[derive(Debug)]
pub struct ResponseHandle {
    state: State,
}

#[derive(Debug)]
enum State {
    Pending(JoinHandle<Response>),
    Ready(Option<Response>),
}

impl ResponseHandle {
    pub(crate) fn pending(join: JoinHandle<Response>) -> Self {
        Self { state: State::Pending(join) }
    }

    /// A handle that is already resolved, used when the call cannot be scheduled at all.
    pub(crate) fn ready(response: Response) -> Self {
        Self { state: State::Ready(Some(response)) }
    }

    /// True once the response is available without blocking.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Pending(join) => join.is_finished(),
            State::Ready(_) => true,
        }
    }

    /// Blocks the current thread until the response is available.
    ///
    /// Do not call this from inside an async task; `.await` the handle instead.
    pub fn wait(self) -> Response {
        pollster::block_on(self)
    }
}

impl Future for ResponseHandle {
    type Output = Response;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Response> {
        let this = self.get_mut();
        match &mut this.state {
            State::Pending(join) => match Pin::new(join).poll(cx) {
                Poll::Ready(Ok(response)) => {
                    this.state = State::Ready(None);
                    Poll::Ready(response)
                }
                Poll::Ready(Err(e)) => {
                    this.state = State::Ready(None);
                    log::error!("request task did not complete: {e}");
                    Poll::Ready(Response::failed(LocoError::TaskFailed(e.to_string()).to_string()))
                }
                Poll::Pending => Poll::Pending,
            },
            State::Ready(slot) => Poll::Ready(
                slot.take()
                    .unwrap_or_else(|| Response::failed("ResponseHandle polled after completion")),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_handle_resolves_immediately() {
        let handle = ResponseHandle::ready(Response::failed("nope"));
        assert!(handle.is_finished());
        assert_eq!(handle.wait().error_message, "nope");
    }
}
