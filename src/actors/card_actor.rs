use std::sync::Arc;

use tokio::spawn;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::engine::FraudEngine;
use crate::models::{TransactionRequest, Verdict};
use crate::types::{CardNumber, TransactionId};

/// A unit of work routed to a card's actor.
#[derive(Debug, Clone)]
pub enum CardCommand {
    Evaluate(TransactionRequest),
    Feedback {
        transaction_id: TransactionId,
        proposed: Verdict
    }
}

/// Serializes engine calls for a single card number.
///
/// Every admission decision and feedback correction for one card flows
/// through one actor and is applied in arrival order, which keeps the
/// per-card limit invariants stable under concurrent input.
pub struct CardActor {
    sender: mpsc::UnboundedSender<CardCommand>,
    handle: JoinHandle<()>
}

impl CardActor {
    /// Spawns the actor task for a card.
    pub fn new(card_number: CardNumber, engine: Arc<FraudEngine>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let handle = spawn(async move {
            while let Some(command) = receiver.recv().await {
                match command {
                    CardCommand::Evaluate(request) => match engine.process(request) {
                        Ok(transaction) => {
                            debug!(
                                "Transaction [{}] for card [{card_number}] decided: {} ({})",
                                transaction.id.unwrap_or_default(),
                                transaction.verdict,
                                transaction.explanation
                            );
                        }
                        Err(error) => {
                            //NOTE: Store failures land here too; the batch keeps going and the
                            //      dropped record is visible in the log.
                            warn!("{error}");
                        }
                    },
                    CardCommand::Feedback { transaction_id, proposed } => {
                        match engine.give_feedback(transaction_id, proposed) {
                            Ok(_) => {
                                debug!("Feedback [{proposed}] recorded for transaction [{transaction_id}] on card [{card_number}]");
                            }
                            Err(error) => {
                                warn!("{error}");
                            }
                        }
                    }
                }
            }
        });

        Self { sender, handle }
    }

    /// Queues a command; false when the actor is no longer accepting.
    pub fn accept(&self, command: CardCommand) -> bool {
        self.sender.send(command).is_ok()
    }

    /// Closes the queue and waits for the actor to drain.
    pub async fn despawn(self) -> Result<(), JoinError> {
        drop(self.sender);
        self.handle.await
    }
}
