//! Runs searches on a dedicated thread so an interactive host stays
//! responsive while the engine thinks.
//!
//! Requests carry their own copy of the position, so the host keeps sole
//! ownership of the live game. There is no cancellation: a request runs to
//! completion and a host that no longer wants it just ignores the reply
//! with that ticket.

use crate::engine::search::NegamaxEngine;
use crate::engine::{Position, SearchError, SearchOutcome, Searcher};
use std::sync::mpsc;
use std::thread::JoinHandle;

pub enum Input<P> {
    ComputeMove { ticket: u64, position: P, depth: u8 },
}

#[derive(Debug, Clone, Copy)]
pub enum Output {
    MoveFound { ticket: u64, outcome: SearchOutcome },
    Failed { ticket: u64, error: SearchError },
}

impl Output {
    pub const fn ticket(&self) -> u64 {
        match self {
            Self::MoveFound { ticket, .. } | Self::Failed { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("failed to spawn search thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("search thread is gone")]
    Disconnected,
    #[error("search thread panicked")]
    Panicked,
}

pub struct SearchWorker<P: Position> {
    input: mpsc::Sender<Input<P>>,
    output: mpsc::Receiver<Output>,
    handle: JoinHandle<NegamaxEngine<P>>,
    next_ticket: u64,
}

impl<P> SearchWorker<P>
where
    P: Position + Send + 'static,
    P::Key: Send,
{
    /// Moves `engine`, and the table it owns, onto a new thread.
    pub fn spawn(engine: NegamaxEngine<P>) -> Result<Self, WorkerError> {
        let (input_tx, input_rx) = mpsc::channel();
        let (output_tx, output_rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("search-worker".to_string())
            .spawn(move || run(engine, &input_rx, &output_tx))?;
        log::debug!("search worker started");

        Ok(Self {
            input: input_tx,
            output: output_rx,
            handle,
            next_ticket: 0,
        })
    }

    /// Queues a search on a copy of `position` and returns its ticket.
    pub fn compute_move(&mut self, position: &P, depth: u8) -> Result<u64, WorkerError> {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.input
            .send(Input::ComputeMove {
                ticket,
                position: position.clone(),
                depth,
            })
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(ticket)
    }

    /// Blocks until the next reply.
    pub fn recv(&self) -> Result<Output, WorkerError> {
        self.output.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Returns the next reply if one is ready.
    pub fn try_recv(&self) -> Result<Option<Output>, WorkerError> {
        match self.output.try_recv() {
            Ok(output) => Ok(Some(output)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }

    /// Waits for queued searches to finish and hands the engine back.
    pub fn shutdown(self) -> Result<NegamaxEngine<P>, WorkerError> {
        let Self { input, handle, .. } = self;
        drop(input);
        let engine = handle.join().map_err(|_| WorkerError::Panicked)?;
        log::debug!("search worker stopped");
        Ok(engine)
    }
}

fn run<P: Position>(
    mut engine: NegamaxEngine<P>,
    input: &mpsc::Receiver<Input<P>>,
    output: &mpsc::Sender<Output>,
) -> NegamaxEngine<P> {
    for msg in input {
        match msg {
            Input::ComputeMove {
                ticket,
                position,
                depth,
            } => {
                let reply = match engine.select_move(&position, depth) {
                    Ok(outcome) => Output::MoveFound { ticket, outcome },
                    Err(error) => {
                        log::error!("search {ticket} failed: {error}");
                        Output::Failed { ticket, error }
                    }
                };
                // The host may have dropped its receiver; the engine still
                // goes back through `shutdown`.
                let _ = output.send(reply);
            }
        }
    }
    engine
}
