//! Background dispatch of panel requests
//!
//! Requests run as tasks on a tokio runtime. Each task reports exactly one
//! [`WorkerMessage`] over a channel, and the UI thread drains the channel
//! with [`QueryController::process_messages`] on every frame or tick. All
//! state changes therefore happen on the thread that owns the panel.

use crate::error::AskError;
use crate::panel::{ApplyResult, PrimaryPress, QueryPanel, RequestId, RequestTicket};
use crate::service::{AnswerClient, AskResponse};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tokio::runtime::Handle;

/// Messages from background request tasks
#[derive(Debug)]
pub enum WorkerMessage {
    Finished {
        id: RequestId,
        outcome: Result<AskResponse, AskError>,
    },
}

/// A [`QueryPanel`] wired to the answer service
pub struct QueryController {
    panel: QueryPanel,
    client: AnswerClient,
    runtime: Handle,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
}

impl QueryController {
    pub fn new(client: AnswerClient, runtime: Handle) -> Self {
        let (tx, rx) = unbounded();
        Self {
            panel: QueryPanel::new(),
            client,
            runtime,
            tx,
            rx,
        }
    }

    pub fn panel(&self) -> &QueryPanel {
        &self.panel
    }

    /// Mutable access for editing the text box
    pub fn panel_mut(&mut self) -> &mut QueryPanel {
        &mut self.panel
    }

    pub fn client(&self) -> &AnswerClient {
        &self.client
    }

    /// Submit `text`; returns whether a request was started
    pub fn submit_query(&mut self, text: &str) -> bool {
        match self.panel.submit_query(text) {
            Some(ticket) => {
                self.dispatch(ticket);
                true
            }
            None => false,
        }
    }

    /// Submit the current text box contents
    pub fn submit(&mut self) -> bool {
        match self.panel.submit() {
            Some(ticket) => {
                self.dispatch(ticket);
                true
            }
            None => false,
        }
    }

    pub fn cancel_query(&mut self) -> bool {
        self.panel.cancel_query()
    }

    /// Primary control: search when idle, stop when pending
    pub fn press_primary(&mut self) {
        if let PrimaryPress::Submitted(ticket) = self.panel.press_primary() {
            self.dispatch(ticket);
        }
    }

    fn dispatch(&self, ticket: RequestTicket) {
        let client = self.client.clone();
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let outcome = client.ask_cancellable(&ticket.query, &ticket.token).await;
            let _ = tx.send(WorkerMessage::Finished {
                id: ticket.id,
                outcome,
            });
        });
    }

    /// Apply every finished request without blocking.
    ///
    /// Returns how many outcomes changed the panel; stale ones do not count.
    pub fn process_messages(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            applied += self.handle(msg);
        }
        applied
    }

    /// Wait up to `timeout` for one message, then drain the rest
    pub fn process_messages_timeout(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => self.handle(msg) + self.process_messages(),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn handle(&mut self, msg: WorkerMessage) -> usize {
        match msg {
            WorkerMessage::Finished { id, outcome } => match self.panel.apply(id, outcome) {
                ApplyResult::Discarded => 0,
                _ => 1,
            },
        }
    }
}
