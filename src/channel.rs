use crate::aggregate;
use crate::errors::Error;
use crate::models::{ChartSeries, Phone, PhoneRollup, Snapshot, StatsResult};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error};

/// Request half of the offload protocol. The serde attributes pin the wire
/// shape: `{"type": "calculateStats", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Request {
    CalculateStats(Snapshot),
    CalculatePhoneData(Vec<Phone>),
    GenerateChartData(Snapshot),
}

impl Request {
    /// Decode a raw protocol envelope. Anything malformed, including a
    /// snapshot without a phone collection, is an invalid-snapshot error.
    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        serde_json::from_value(value).map_err(|err| Error::InvalidSnapshot(err.to_string()))
    }
}

/// Response half: `{"type": "statsResult", "result": {...}}`. The `error`
/// kind guarantees a pending caller always resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "result", rename_all = "camelCase")]
pub enum Response {
    StatsResult(StatsResult),
    PhoneResult(Vec<PhoneRollup>),
    ChartResult(ChartSeries),
    Error { message: String },
}

struct Envelope {
    id: u64,
    request: Request,
    reply: oneshot::Sender<Reply>,
}

struct Reply {
    /// Correlation id, echoed from the request envelope.
    id: u64,
    response: Response,
}

/// Handle to the background computation worker. Cloning shares the same
/// worker; each `send` gets its own reply slot, so concurrent outstanding
/// requests never cross wires.
#[derive(Clone)]
pub struct OffloadChannel {
    tx: mpsc::Sender<Envelope>,
    next_id: Arc<AtomicU64>,
    timeout: Duration,
}

impl OffloadChannel {
    /// Spawn the worker task and return the caller-side handle.
    pub fn spawn(reply_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(worker(rx));
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
            timeout: reply_timeout,
        }
    }

    /// Issue a request and await its tagged response. Non-blocking for the
    /// rest of the surface: the fold runs on the worker task, not here.
    pub async fn send(&self, request: Request) -> Result<Response, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                id,
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::Channel("background worker is gone".into()))?;

        let reply = timeout(self.timeout, reply_rx)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(|_| Error::Channel("background worker dropped the request".into()))?;

        if reply.id != id {
            return Err(Error::Channel(format!(
                "response id {} does not match request id {id}",
                reply.id
            )));
        }
        Ok(reply.response)
    }
}

/// Single worker, FIFO over the queue, exactly one reply per request. A
/// panicking computation becomes an `error` response; the worker survives it.
async fn worker(mut rx: mpsc::Receiver<Envelope>) {
    while let Some(Envelope { id, request, reply }) = rx.recv().await {
        debug!(id, "processing offload request");
        let response = match panic::catch_unwind(AssertUnwindSafe(|| handle(request))) {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload);
                error!(id, %message, "offload computation panicked");
                Response::Error { message }
            }
        };
        // Caller may have timed out and dropped its receiver.
        let _ = reply.send(Reply { id, response });
    }
}

fn handle(request: Request) -> Response {
    match request {
        Request::CalculateStats(snapshot) => {
            Response::StatsResult(aggregate::compute_stats(&snapshot))
        }
        Request::CalculatePhoneData(phones) => {
            Response::PhoneResult(aggregate::compute_phone_rollups(&phones))
        }
        Request::GenerateChartData(snapshot) => Response::ChartResult(
            aggregate::compute_chart_series(&snapshot, aggregate::CHART_WINDOW_DAYS),
        ),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "computation panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppRecord;

    fn spec_snapshot() -> Snapshot {
        serde_json::from_value(serde_json::json!({
            "phones": [{
                "id": "A",
                "apps": [{
                    "balance": 50, "earned": 100, "withdrawn": 20,
                    "historicalWithdrawn": 5, "minWithdraw": 50
                }]
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn calculate_stats_round_trip() {
        let channel = OffloadChannel::spawn(Duration::from_secs(1));
        let response = channel
            .send(Request::CalculateStats(spec_snapshot()))
            .await
            .unwrap();
        match response {
            Response::StatsResult(stats) => {
                assert_eq!(stats.total_phones, 1);
                assert_eq!(stats.total_apps, 1);
                assert_eq!(stats.total_balance, 50.0);
                assert_eq!(stats.total_earned, 100.0);
                assert_eq!(stats.total_withdrawn, 25.0);
                assert_eq!(stats.ready_apps, 1);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_requests_demultiplex_by_kind() {
        let channel = OffloadChannel::spawn(Duration::from_secs(1));
        let phones = vec![
            Phone {
                id: "first".into(),
                apps: vec![AppRecord::default()],
            },
            Phone {
                id: "second".into(),
                apps: vec![],
            },
        ];

        let (stats, rollups, chart) = tokio::join!(
            channel.send(Request::CalculateStats(spec_snapshot())),
            channel.send(Request::CalculatePhoneData(phones)),
            channel.send(Request::GenerateChartData(spec_snapshot())),
        );

        assert!(matches!(stats.unwrap(), Response::StatsResult(_)));
        match rollups.unwrap() {
            Response::PhoneResult(rollups) => {
                assert_eq!(rollups.len(), 2);
                assert_eq!(rollups[0].id, "first");
                assert_eq!(rollups[1].id, "second");
            }
            other => panic!("unexpected response: {other:?}"),
        }
        match chart.unwrap() {
            Response::ChartResult(series) => assert_eq!(series.len(), 7),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dead_worker_surfaces_channel_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let channel = OffloadChannel {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
            timeout: Duration::from_millis(100),
        };
        let err = channel
            .send(Request::CalculateStats(spec_snapshot()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Channel(_)));
    }

    #[tokio::test]
    async fn unanswered_request_times_out() {
        let (tx, mut rx) = mpsc::channel::<Envelope>(1);
        // Worker stand-in that holds the reply slot open without answering.
        tokio::spawn(async move {
            let mut parked = Vec::new();
            while let Some(envelope) = rx.recv().await {
                parked.push(envelope);
            }
        });
        let channel = OffloadChannel {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
            timeout: Duration::from_millis(50),
        };
        let err = channel
            .send(Request::CalculateStats(spec_snapshot()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[test]
    fn wire_format_matches_protocol_table() {
        let request = Request::CalculateStats(spec_snapshot());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "calculateStats");
        assert_eq!(value["data"]["phones"][0]["id"], "A");

        let response = Response::Error {
            message: "boom".into(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["result"]["message"], "boom");

        let stats = Response::StatsResult(StatsResult {
            total_phones: 1,
            total_apps: 1,
            total_balance: 50.0,
            total_earned: 100.0,
            total_withdrawn: 25.0,
            ready_apps: 1,
        });
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["type"], "statsResult");
        assert_eq!(value["result"]["totalPhones"], 1);
        assert_eq!(value["result"]["totalWithdrawn"], 25.0);
    }

    #[test]
    fn malformed_envelope_is_invalid_snapshot() {
        let err = Request::from_value(serde_json::json!({
            "type": "calculateStats",
            "data": {}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));

        let err =
            Request::from_value(serde_json::json!({ "type": "unknownKind", "data": null }))
                .unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
    }
}
