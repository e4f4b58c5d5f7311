// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::{error::LocationError, stream::LocationResult};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc, Mutex, OnceLock, Weak,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Buffering of a location channel.
///
/// Location updates are low-frequency, so the default buffers without a
/// limit. A bounded channel drops the newest result when it is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueCapacity {
    #[default]
    Unbounded,
    Bounded(usize),
}

/// Why the producer side of a channel closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The owner finished the stream, the consumer sees a clean end.
    Finished,
    /// The stream was torn down underneath a listening consumer.
    Cancelled,
}

enum Sender {
    Unbounded(mpsc::UnboundedSender<LocationResult>),
    Bounded(mpsc::Sender<LocationResult>),
}

enum Receiver {
    Unbounded(mpsc::UnboundedReceiver<LocationResult>),
    Bounded(mpsc::Receiver<LocationResult>),
}

impl Receiver {
    async fn recv(&mut self) -> Option<LocationResult> {
        match self {
            Receiver::Unbounded(receiver) => receiver.recv().await,
            Receiver::Bounded(receiver) => receiver.recv().await,
        }
    }
}

/// The writing end of a location channel.
///
/// Dropping the producer without [`LocationProducer::finish`] closes the
/// channel with an unknown reason.
pub struct LocationProducer {
    sender: Sender,
    termination: Arc<OnceLock<TerminationReason>>,
    session: u64,
}

impl LocationProducer {
    /// Pushes a result to the consumer.
    ///
    /// Never blocks, it is safe to call from provider threads. Returns `false`
    /// if the result was dropped because the consumer is gone or the bounded
    /// buffer is full.
    pub fn enqueue(&self, result: LocationResult) -> bool {
        match &self.sender {
            Sender::Unbounded(sender) => sender.send(result).is_ok(),
            Sender::Bounded(sender) => match sender.try_send(result) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "Location queue of session {} is full, dropping newest result",
                        self.session
                    );
                    false
                }
                Err(TrySendError::Closed(_)) => false,
            },
        }
    }

    /// Closes the channel. No further results can be enqueued.
    pub fn finish(self, reason: TerminationReason) {
        let _ = self.termination.set(reason);
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}

type TerminationHandler = Box<dyn FnOnce() + Send>;

struct StreamShared {
    receiver: tokio::sync::Mutex<Receiver>,
    termination: Arc<OnceLock<TerminationReason>>,
    failure_reported: AtomicBool,
    on_termination: Mutex<Option<TerminationHandler>>,
    session: u64,
}

impl Drop for StreamShared {
    fn drop(&mut self) {
        let handler = self
            .on_termination
            .get_mut()
            .unwrap_or_else(|handler| handler.into_inner())
            .take();
        if let Some(handler) = handler {
            debug!("Location stream of session {} dropped", self.session);
            handler();
        }
    }
}

/// The reading end of a location channel.
///
/// Clones share the same channel, every result is delivered to exactly one
/// of them. When the last clone is dropped the termination handler of the
/// channel runs, which lets the owner stop the provider.
#[derive(Clone)]
pub struct LocationStream {
    shared: Arc<StreamShared>,
}

impl LocationStream {
    /// Waits for the next result.
    ///
    /// Returns `None` once the channel is closed. If it closed for any reason
    /// other than [`TerminationReason::Finished`] a single terminal failure is
    /// returned before that.
    pub async fn next(&self) -> Option<LocationResult> {
        {
            let mut receiver = self.shared.receiver.lock().await;
            if let Some(result) = receiver.recv().await {
                return Some(result);
            }
        }
        let failure = match self.shared.termination.get() {
            Some(TerminationReason::Finished) => return None,
            Some(TerminationReason::Cancelled) => LocationError::StreamCanceled,
            None => LocationError::StreamUnknownTermination,
        };
        if self.shared.failure_reported.swap(true, Ordering::AcqRel) {
            return None;
        }
        warn!(
            "Location stream of session {} terminated: {}",
            self.shared.session, failure
        );
        Some(Err(failure))
    }

    /// Converts the handle into a [`futures::Stream`].
    pub fn into_stream(self) -> impl Stream<Item = LocationResult> + Send + 'static {
        futures::stream::unfold(self, |stream| async move {
            let result = stream.next().await?;
            Some((result, stream))
        })
    }

    /// Returns the id of the session this stream belongs to.
    pub fn session(&self) -> u64 {
        self.shared.session
    }
}

/// Creates a new location channel.
///
/// `on_termination` runs once, when the last [`LocationStream`] handle is
/// dropped.
pub fn channel<F>(
    capacity: QueueCapacity,
    session: u64,
    on_termination: F,
) -> (LocationProducer, LocationStream)
where
    F: FnOnce() + Send + 'static,
{
    let (sender, receiver) = match capacity {
        QueueCapacity::Unbounded => {
            let (sender, receiver) = mpsc::unbounded_channel();
            (Sender::Unbounded(sender), Receiver::Unbounded(receiver))
        }
        QueueCapacity::Bounded(capacity) => {
            let (sender, receiver) = mpsc::channel(capacity.max(1));
            (Sender::Bounded(sender), Receiver::Bounded(receiver))
        }
    };
    let termination = Arc::new(OnceLock::new());
    let producer = LocationProducer {
        sender,
        termination: termination.clone(),
        session,
    };
    let stream = LocationStream {
        shared: Arc::new(StreamShared {
            receiver: tokio::sync::Mutex::new(receiver),
            termination,
            failure_reported: AtomicBool::new(false),
            on_termination: Mutex::new(Some(Box::new(on_termination))),
            session,
        }),
    };
    (producer, stream)
}

/// Holds at most one live location channel.
///
/// Opening a new channel discards the previous one. Each channel gets a new
/// session id so that a stale handle can't tear down a newer session.
#[derive(Default)]
pub struct LocationQueue {
    capacity: QueueCapacity,
    producer: Option<LocationProducer>,
    stream: Weak<StreamShared>,
    last_session: u64,
}

impl LocationQueue {
    pub fn new(capacity: QueueCapacity) -> Self {
        LocationQueue {
            capacity,
            ..Default::default()
        }
    }

    /// Returns a handle of the open channel if its consumer is still alive.
    pub fn live_stream(&self) -> Option<LocationStream> {
        self.producer.as_ref()?;
        self.stream
            .upgrade()
            .map(|shared| LocationStream { shared })
    }

    /// Opens a new channel.
    ///
    /// `on_termination` is called with the id of the new session when its last
    /// stream handle is dropped. A previously open producer is returned so the
    /// caller can finish it.
    pub fn open<F>(&mut self, on_termination: F) -> (LocationStream, Option<LocationProducer>)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let stale = self.producer.take();
        self.last_session += 1;
        let session = self.last_session;
        let (producer, stream) = channel(self.capacity, session, move || on_termination(session));
        self.producer = Some(producer);
        self.stream = Arc::downgrade(&stream.shared);
        (stream, stale)
    }

    /// Pushes a result into the open channel.
    ///
    /// Returns `false` if no channel is open or the result was dropped.
    pub fn enqueue(&self, result: LocationResult) -> bool {
        match &self.producer {
            Some(producer) => producer.enqueue(result),
            None => false,
        }
    }

    /// Takes the producer of the open channel, if any.
    pub fn take(&mut self) -> Option<LocationProducer> {
        self.stream = Weak::new();
        self.producer.take()
    }

    /// Takes the producer of the open channel if it belongs to `session`.
    pub fn take_session(&mut self, session: u64) -> Option<LocationProducer> {
        if self.producer.as_ref()?.session() != session {
            return None;
        }
        self.take()
    }

    /// Returns `true` while a channel is open.
    pub fn is_open(&self) -> bool {
        self.producer.is_some()
    }

    /// Returns the id of the open channel.
    pub fn session(&self) -> Option<u64> {
        self.producer.as_ref().map(|producer| producer.session())
    }
}
