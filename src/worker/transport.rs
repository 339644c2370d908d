use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
};

use tracing::instrument;

use super::protocol::{BuildFailure, HANDSHAKE_DATA, Request, Response};
use crate::container::Assembler;

/// Name of the background thread.
const THREAD_NAME: &str = "bcf-worker";

/// What the worker is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    /// Waiting for a request.
    Idle,
    /// Assembling a container.
    Building,
    /// The last build failed. The next request returns the worker to
    /// [`State::Idle`] first.
    Failed,
}

impl State {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Building,
            2 => Self::Failed,
            _ => Self::Idle,
        }
    }
}

/// Errors talking to the worker.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The worker thread could not be started.
    #[error("failed to start worker thread: {0}")]
    Spawn(#[source] io::Error),

    /// The worker thread has stopped.
    #[error("worker is no longer running")]
    Disconnected,

    /// The worker answered with the wrong kind of message.
    #[error("unexpected '{actual}' reply, expected '{expected}'")]
    UnexpectedReply {
        /// The tag that was expected.
        expected: &'static str,
        /// The tag that arrived.
        actual: &'static str,
    },
}

struct Envelope {
    request: Request,
    reply: Sender<Response>,
}

/// A reply that has not arrived yet.
#[derive(Debug)]
#[must_use = "the reply is lost unless it is waited for"]
pub struct PendingReply {
    receiver: Receiver<Response>,
}

impl PendingReply {
    /// Blocks until the worker replies.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] if the worker stopped before
    /// replying.
    pub fn wait(self) -> Result<Response, TransportError> {
        self.receiver
            .recv()
            .map_err(|_| TransportError::Disconnected)
    }
}

/// Handle to a background worker that builds containers.
///
/// Requests are processed one at a time, in the order they are posted. A
/// build request posted while another build is running waits its turn.
/// A failed build does not stop the worker.
///
/// Dropping the handle stops the worker once the queued requests are done.
#[derive(Debug)]
pub struct Transport {
    sender: Option<Sender<Envelope>>,
    handle: Option<JoinHandle<()>>,
    state: Arc<AtomicU8>,
}

impl Transport {
    /// Starts a worker that builds with `assembler`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Spawn`] if the thread cannot be started.
    pub fn spawn(assembler: Assembler) -> Result<Self, TransportError> {
        let (sender, receiver) = mpsc::channel::<Envelope>();
        let state = Arc::new(AtomicU8::new(State::Idle as u8));

        let worker = Worker {
            assembler,
            state: Arc::clone(&state),
        };
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || worker.run(&receiver))
            .map_err(TransportError::Spawn)?;

        tracing::debug!("worker started");
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            state,
        })
    }

    /// Queues `request`, returning a handle to its reply.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] if the worker has stopped.
    pub fn post(&self, request: Request) -> Result<PendingReply, TransportError> {
        let sender = self.sender.as_ref().ok_or(TransportError::Disconnected)?;
        let (reply, receiver) = mpsc::channel();
        sender
            .send(Envelope { request, reply })
            .map_err(|_| TransportError::Disconnected)?;
        Ok(PendingReply { receiver })
    }

    /// Posts `request` and waits for the reply.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] if the worker has stopped.
    #[instrument(skip_all)]
    pub fn request(&self, request: Request) -> Result<Response, TransportError> {
        self.post(request)?.wait()
    }

    /// Checks the worker is alive.
    ///
    /// # Errors
    ///
    /// Fails if the worker has stopped or does not answer with a handshake.
    pub fn handshake(&self) -> Result<(), TransportError> {
        match self.request(Request::Test)? {
            Response::Test { data } if data == HANDSHAKE_DATA => Ok(()),
            other => Err(TransportError::UnexpectedReply {
                expected: "test",
                actual: other.tag(),
            }),
        }
    }

    /// What the worker is doing right now.
    #[must_use]
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        // Closing the channel ends the worker's receive loop.
        self.sender.take();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() {
            tracing::warn!("worker thread panicked");
        }
    }
}

struct Worker {
    assembler: Assembler,
    state: Arc<AtomicU8>,
}

impl Worker {
    fn set_state(&self, state: State) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn run(&self, inbox: &Receiver<Envelope>) {
        for Envelope { request, reply } in inbox {
            if State::from_u8(self.state.load(Ordering::Acquire)) == State::Failed {
                tracing::debug!("recovering from failed build");
                self.set_state(State::Idle);
            }

            let response = self.handle(request);
            if reply.send(response).is_err() {
                tracing::debug!("reply dropped, caller went away");
            }
        }
        tracing::debug!("worker stopped");
    }

    fn handle(&self, request: Request) -> Response {
        match request {
            Request::Test => Response::Test {
                data: HANDSHAKE_DATA.to_string(),
            },
            Request::Begin { topics, header } => {
                self.set_state(State::Building);
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    self.assembler.build(&topics, &header)
                }));

                match outcome {
                    Ok(Ok(data)) => {
                        self.set_state(State::Idle);
                        Response::Begin { data }
                    }
                    Ok(Err(error)) => {
                        tracing::warn!(%error, "build failed");
                        self.set_state(State::Failed);
                        Response::Error {
                            error: BuildFailure::from(&error),
                        }
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        tracing::error!(%message, "build panicked");
                        self.set_state(State::Failed);
                        Response::Error {
                            error: BuildFailure::internal(message),
                        }
                    }
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_string())
}
