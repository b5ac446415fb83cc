// Line-delimited JSON-RPC transport over standard streams

use crate::error::McpResult;
use crate::protocol::{CancelledParams, JsonRpcRequest};
use crate::server::McpServer;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// In-flight calls keyed by the serialized request id. Ids are not
/// guaranteed unique, so each entry tracks every call sharing the id by its
/// line sequence number.
type InFlight = Arc<Mutex<HashMap<String, Vec<(u64, CancellationToken)>>>>;

/// Serve MCP on this process's stdin/stdout until stdin closes
pub async fn serve_stdio(server: Arc<McpServer>) -> McpResult<()> {
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve MCP over an arbitrary line-oriented stream pair.
///
/// Each request runs on its own task. Responses are written by a single
/// writer, one JSON document per line, in completion order.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> McpResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tracing::info!("MCP server listening on stdio");

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer_task = tokio::spawn(write_lines(writer, rx));

    let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
    let mut tasks = JoinSet::new();
    let mut lines = BufReader::new(reader).lines();
    let mut seq: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        seq += 1;
        let call_seq = seq;
        let token = CancellationToken::new();
        let key = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => {
                if request.method == "notifications/cancelled" {
                    cancel_in_flight(&in_flight, request.params);
                }
                request.id.map(|id| id.to_string())
            }
            Err(_) => None,
        };
        if let Some(key) = &key {
            lock(&in_flight)
                .entry(key.clone())
                .or_default()
                .push((call_seq, token.clone()));
        }

        let server = server.clone();
        let tx = tx.clone();
        let in_flight = in_flight.clone();
        tasks.spawn(async move {
            let response = server.handle_message(&line, token).await;
            if let Some(key) = key {
                forget_in_flight(&in_flight, &key, call_seq);
            }
            if let Some(response) = response {
                match serde_json::to_string(&response) {
                    Ok(json) => {
                        let _ = tx.send(json);
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to serialize response"),
                }
            }
        });

        // Reap finished tasks so the set does not grow without bound
        while tasks.try_join_next().is_some() {}
    }

    tracing::info!("stdin closed, draining in-flight requests");
    while tasks.join_next().await.is_some() {}
    drop(tx);

    match writer_task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "stdout writer task failed");
            Ok(())
        }
    }
}

async fn write_lines<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

fn cancel_in_flight(in_flight: &InFlight, params: Option<serde_json::Value>) {
    let Some(params) = params.and_then(|p| serde_json::from_value::<CancelledParams>(p).ok()) else {
        tracing::warn!("notifications/cancelled without a requestId");
        return;
    };

    let key = params.request_id.to_string();
    match lock(in_flight).get(&key) {
        Some(calls) => {
            tracing::info!(request_id = %key, reason = ?params.reason, calls = calls.len(), "Cancelling request");
            for (_, token) in calls {
                token.cancel();
            }
        }
        None => tracing::debug!(request_id = %key, "Cancellation for unknown or finished request"),
    }
}

fn forget_in_flight(in_flight: &InFlight, key: &str, call_seq: u64) {
    let mut map = lock(in_flight);
    if let Some(calls) = map.get_mut(key) {
        calls.retain(|(seq, _)| *seq != call_seq);
        if calls.is_empty() {
            map.remove(key);
        }
    }
}

fn lock(
    in_flight: &InFlight,
) -> std::sync::MutexGuard<'_, HashMap<String, Vec<(u64, CancellationToken)>>> {
    // A panicked task cannot leave the map half-updated, so recover from poison
    in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
