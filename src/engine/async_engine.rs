use crate::actors::{CardActor, CardCommand};
use crate::engine::FraudEngine;
use crate::models::{TransactionRequest, Verdict, WorldRegion};
use crate::storage::{StolenCardRegistry, SuspiciousIpRegistry};
use crate::types::{Amount, CardNumber, TransactionId};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use futures::future::join_all;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum RecordKind {
    Transaction,
    Feedback,
    StolenCard,
    CardRecovered,
    SuspiciousIp,
    IpCleared
}

/// One row of the batch input file.
///
/// All record kinds share a single header, so everything beyond the kind is
/// optional at parse time and checked during conversion. Feedback rows carry
/// the card number so the router can keep a correction behind the card's own
/// admissions.
#[derive(Debug, Clone, Deserialize)]
struct InputRecord {
    #[serde(rename = "type")]
    kind: RecordKind,
    number: Option<CardNumber>,
    amount: Option<Amount>,
    ip: Option<String>,
    region: Option<WorldRegion>,
    date: Option<NaiveDateTime>,
    tx: Option<TransactionId>,
    feedback: Option<Verdict>
}

impl InputRecord {
    fn into_command(self) -> Result<CardCommand, &'static str> {
        match self.kind {
            RecordKind::Transaction => {
                let card_number = self.number.ok_or("number is required")?;
                let amount = self.amount.ok_or("amount is required")?;
                let ip = self.ip.ok_or("ip is required")?;
                let region = self.region.ok_or("region is required")?;
                let timestamp = self.date.ok_or("date is required")?;

                Ipv4Addr::from_str(&ip).map_err(|_| "ip is not a dotted quad")?;

                Ok(CardCommand::Evaluate(TransactionRequest {
                    amount,
                    ip,
                    card_number,
                    region,
                    timestamp
                }))
            }
            RecordKind::Feedback => {
                let transaction_id = self.tx.ok_or("tx is required")?;
                let proposed = self.feedback.ok_or("feedback is required")?;

                Ok(CardCommand::Feedback {
                    transaction_id,
                    proposed
                })
            }
            _ => Err("registry records are not card commands")
        }
    }
}

/// Batch admission pipeline: streams an input CSV through per-card actors.
///
/// Registry records mutate the stolen-card and suspicious-IP registries at
/// routing time, before any later row is dispatched; seed them at the top of
/// the file so every admission sees them.
pub struct AsyncEngine {
    engine: Arc<FraudEngine>,
    stolen_cards: Arc<dyn StolenCardRegistry>,
    suspicious_ips: Arc<dyn SuspiciousIpRegistry>,
    backpressure: usize
}

impl AsyncEngine {
    /// Creates a new pipeline over the provided engine and registries.
    pub fn new(
        engine: Arc<FraudEngine>,
        stolen_cards: Arc<dyn StolenCardRegistry>,
        suspicious_ips: Arc<dyn SuspiciousIpRegistry>
    ) -> Self {
        Self {
            engine,
            stolen_cards,
            suspicious_ips,
            backpressure: 256
        }
    }

    /// Orchestrates the end-to-end admission pipeline for a CSV file.
    pub async fn run(&self, path: &str) -> anyhow::Result<()> {
        let (sender, receiver) = mpsc::channel::<InputRecord>(self.backpressure);
        let csv_handle = Self::spawn_csv_reader(path.to_string(), sender);
        let routing_result = self.route_records(receiver).await;

        if let Err(error) = csv_handle.await {
            error!("CSV ingestion failed: {error}");
        }

        routing_result
    }

    fn spawn_csv_reader(path: String, sender: mpsc::Sender<InputRecord>) -> JoinHandle<()> {
        spawn_blocking(move || {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(error) => {
                    error!("Error opening CSV at path: {path} | {error}");
                    return;
                }
            };

            let mut reader = ReaderBuilder::new()
                .trim(Trim::All)
                .flexible(true)
                .from_reader(BufReader::new(file));

            for result in reader.deserialize::<InputRecord>() {
                match result {
                    Ok(record) => {
                        if sender.blocking_send(record).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        error!("CSV deserialization error: {error}");
                    }
                }
            }
        })
    }

    async fn route_records(&self, mut receiver: mpsc::Receiver<InputRecord>) -> anyhow::Result<()> {
        let mut actors = HashMap::<CardNumber, CardActor>::new();

        // NOTE: Routing by card number mimics a partitioned consumer stream. It keeps every
        //       decision and correction for one card strictly ordered.
        while let Some(record) = receiver.recv().await {
            match record.kind {
                RecordKind::StolenCard | RecordKind::CardRecovered => {
                    self.apply_card_registry_record(record);
                    continue;
                }
                RecordKind::SuspiciousIp | RecordKind::IpCleared => {
                    self.apply_ip_registry_record(record);
                    continue;
                }
                RecordKind::Transaction | RecordKind::Feedback => {}
            }

            let Some(card_number) = record.number.clone() else {
                error!("Record dropped: number is required");
                continue;
            };

            let command = match record.into_command() {
                Ok(command) => command,
                Err(reason) => {
                    error!("Record for card [{card_number}] dropped: {reason}");
                    continue;
                }
            };

            let actor = actors.entry(card_number.clone()).or_insert_with(|| {
                CardActor::new(card_number.clone(), self.engine.clone())
            });

            if !actor.accept(command) {
                error!("Card actor for [{card_number}] could not accept a command");
            }
        }

        //NOTE: Provide a graceful shutdown and wait for all actors to finish draining their
        //      individual queues
        let despawns = actors.into_values().map(|actor| actor.despawn());

        for result in join_all(despawns).await {
            if let Err(error) = result {
                error!("A card actor did not despawn gracefully: {error:?}");
            }
        }

        Ok(())
    }

    fn apply_card_registry_record(&self, record: InputRecord) {
        let Some(card_number) = record.number else {
            error!("Registry record dropped: number is required");
            return;
        };

        let outcome = match record.kind {
            RecordKind::StolenCard => self.stolen_cards.add(card_number.clone()),
            _ => self.stolen_cards.remove(&card_number)
        };

        match outcome {
            Ok(true) => debug!("Stolen card registry updated for [{card_number}]"),
            Ok(false) => warn!("Stolen card registry already reflects [{card_number}]"),
            Err(error) => error!("{error}")
        }
    }

    fn apply_ip_registry_record(&self, record: InputRecord) {
        let Some(ip) = record.ip else {
            error!("Registry record dropped: ip is required");
            return;
        };

        let outcome = match record.kind {
            RecordKind::SuspiciousIp => self.suspicious_ips.add(ip.clone()),
            _ => self.suspicious_ips.remove(&ip)
        };

        match outcome {
            Ok(true) => debug!("Suspicious IP registry updated for [{ip}]"),
            Ok(false) => warn!("Suspicious IP registry already reflects [{ip}]"),
            Err(error) => error!("{error}")
        }
    }
}
