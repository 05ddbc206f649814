//! Per-chat processing queues.
//!
//! Each chat gets its own unbounded queue and worker task, so events from
//! one chat are handled strictly in order while different chats proceed
//! concurrently.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::{
    model::ChatId,
    router::{CommandRouter, InboundEvent},
};

type QueueSender = mpsc::UnboundedSender<InboundEvent>;

pub struct ChatQueues {
    router: Arc<CommandRouter>,
    queues: DashMap<ChatId, QueueSender>,
}

impl ChatQueues {
    pub fn new(router: Arc<CommandRouter>) -> Self {
        Self {
            router,
            queues: DashMap::new(),
        }
    }

    /// Enqueue an event for its chat. Must be called inside a Tokio runtime.
    pub fn submit(&self, event: InboundEvent) {
        let chat_id = event.chat_id;

        let Err(mpsc::error::SendError(event)) = self.queue(chat_id).send(event) else {
            return;
        };

        // The worker is gone (it panicked); start a fresh one.
        warn!(chat_id, "Chat worker stopped, restarting");
        self.queues.remove(&chat_id);
        if let Err(e) = self.queue(chat_id).send(event) {
            error!(chat_id, error = %e, "Cannot enqueue event");
        }
    }

    pub fn active_chats(&self) -> usize {
        self.queues.len()
    }

    fn queue(&self, chat_id: ChatId) -> QueueSender {
        self.queues
            .entry(chat_id)
            .or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                tokio::spawn(process_queue_loop(chat_id, self.router.clone(), rx));
                tx
            })
            .clone()
    }
}

async fn process_queue_loop(
    chat_id: ChatId,
    router: Arc<CommandRouter>,
    mut rx: mpsc::UnboundedReceiver<InboundEvent>,
) {
    debug!(chat_id, "Chat worker started");
    while let Some(event) = rx.recv().await {
        router.dispatch(&event).await;
    }
}
