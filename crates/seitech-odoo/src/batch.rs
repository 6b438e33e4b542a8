//! Request batching queue.
//!
//! Independent ORM calls issued close together are coalesced: the queue is
//! flushed when it holds [`MAX_BATCH_SIZE`] calls or [`BATCH_DELAY`] after the
//! first call arrived, whichever comes first. A flush runs its calls
//! concurrently and hands every caller its own result. If the flush cannot
//! start at all (no service session), every caller receives that error.
//!
//! Calls in one batch are unordered relative to each other.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::debug;

use crate::client::{OdooClient, SearchRead};
use crate::domain::Domain;
use crate::error::OdooError;

pub const BATCH_DELAY: Duration = Duration::from_millis(50);
pub const MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct BatchCall {
    pub model: String,
    pub method: String,
    pub args: Value,
    pub kwargs: Value,
}

/// Runs one flushed batch.
pub trait BatchExecutor: Send + Sync + 'static {
    /// Returns one result per call, in call order. An outer error fails the
    /// whole batch.
    fn execute_batch(
        &self,
        calls: Vec<BatchCall>,
    ) -> impl Future<Output = Result<Vec<Result<Value, OdooError>>, OdooError>> + Send;
}

impl BatchExecutor for OdooClient {
    async fn execute_batch(
        &self,
        calls: Vec<BatchCall>,
    ) -> Result<Vec<Result<Value, OdooError>>, OdooError> {
        let sid = self.service_session_id().await?;

        let handles: Vec<_> = calls
            .into_iter()
            .map(|call| {
                let client = self.clone();
                let sid = sid.clone();
                tokio::spawn(async move {
                    client
                        .call_kw_as(&sid, &call.model, &call.method, call.args, call.kwargs)
                        .await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.unwrap_or_else(|e| {
                Err(OdooError::Transport(format!("batched call aborted: {e}")))
            }));
        }
        Ok(results)
    }
}

struct Pending {
    call: BatchCall,
    reply: oneshot::Sender<Result<Value, OdooError>>,
}

/// Handle to the batching queue. Cloning shares the same queue.
#[derive(Clone)]
pub struct BatchClient {
    tx: mpsc::UnboundedSender<Pending>,
}

impl std::fmt::Debug for BatchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchClient").finish_non_exhaustive()
    }
}

impl BatchClient {
    /// Start the queue on the current Tokio runtime.
    pub fn spawn<E: BatchExecutor>(executor: E) -> Self {
        Self::with_limits(executor, BATCH_DELAY, MAX_BATCH_SIZE)
    }

    pub fn with_limits<E: BatchExecutor>(executor: E, delay: Duration, max_size: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_queue(Arc::new(executor), rx, delay, max_size.max(1)));
        Self { tx }
    }

    pub async fn call(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, OdooError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Pending {
                call: BatchCall {
                    model: model.to_string(),
                    method: method.to_string(),
                    args,
                    kwargs,
                },
                reply,
            })
            .map_err(|_| OdooError::Transport("batch queue is closed".into()))?;

        response
            .await
            .map_err(|_| OdooError::Transport("batch flush was dropped".into()))?
    }

    pub async fn search_read(&self, model: &str, query: SearchRead) -> Result<Vec<Value>, OdooError> {
        match self
            .call(model, "search_read", json!([]), query.into_kwargs())
            .await?
        {
            Value::Array(records) => Ok(records),
            Value::Null | Value::Bool(false) => Ok(Vec::new()),
            other => Err(OdooError::Decode(format!("expected records, got {other}"))),
        }
    }

    pub async fn search_count(&self, model: &str, domain: Domain) -> Result<i64, OdooError> {
        let result = self
            .call(model, "search_count", json!([domain]), json!({}))
            .await?;
        result
            .as_i64()
            .ok_or_else(|| OdooError::Decode(format!("search_count returned {result}")))
    }
}

async fn run_queue<E: BatchExecutor>(
    executor: Arc<E>,
    mut rx: mpsc::UnboundedReceiver<Pending>,
    delay: Duration,
    max_size: usize,
) {
    while let Some(first) = rx.recv().await {
        let deadline = Instant::now() + delay;
        let mut batch = vec![first];

        while batch.len() < max_size {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(pending)) => batch.push(pending),
                Ok(None) | Err(_) => break,
            }
        }

        tokio::spawn(flush(executor.clone(), batch));
    }
}

async fn flush<E: BatchExecutor>(executor: Arc<E>, batch: Vec<Pending>) {
    let size = batch.len();
    let (calls, replies): (Vec<_>, Vec<_>) = batch.into_iter().map(|p| (p.call, p.reply)).unzip();

    debug!(batch.size = size, "Flushing Odoo batch");
    counter!("odoo_batch_flushes_total").increment(1);
    histogram!("odoo_batch_size").record(size as f64);

    match executor.execute_batch(calls).await {
        Ok(results) => {
            let mut results = results.into_iter();
            for reply in replies {
                let result = results
                    .next()
                    .unwrap_or_else(|| Err(OdooError::Decode("batch returned too few results".into())));
                let _ = reply.send(result);
            }
        }
        Err(e) => {
            for reply in replies {
                let _ = reply.send(Err(e.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        sizes: Mutex<Vec<usize>>,
        fail: bool,
    }

    impl BatchExecutor for Arc<Recording> {
        async fn execute_batch(
            &self,
            calls: Vec<BatchCall>,
        ) -> Result<Vec<Result<Value, OdooError>>, OdooError> {
            self.sizes.lock().unwrap().push(calls.len());
            if self.fail {
                return Err(OdooError::InvalidCredentials);
            }
            Ok(calls
                .into_iter()
                .map(|call| Ok(json!({ "model": call.model, "method": call.method })))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_each_caller_gets_its_own_result() {
        let recording = Arc::new(Recording::default());
        let batch = BatchClient::spawn(recording.clone());

        let (a, b) = tokio::join!(
            batch.call("res.partner", "search_read", json!([]), json!({})),
            batch.call("slide.channel", "search_count", json!([]), json!({})),
        );

        assert_eq!(a.unwrap()["model"], "res.partner");
        assert_eq!(b.unwrap()["method"], "search_count");
        assert_eq!(recording.sizes.lock().unwrap().iter().sum::<usize>(), 2);
    }

    #[tokio::test]
    async fn test_batches_never_exceed_max_size() {
        let recording = Arc::new(Recording::default());
        let batch = BatchClient::spawn(recording.clone());

        let mut handles = Vec::new();
        for i in 0..25 {
            let batch = batch.clone();
            handles.push(tokio::spawn(async move {
                batch
                    .call("seitech.badge", &format!("m{i}"), json!([]), json!({}))
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let sizes = recording.sizes.lock().unwrap().clone();
        assert_eq!(sizes.iter().sum::<usize>(), 25);
        assert!(sizes.iter().all(|&size| size <= MAX_BATCH_SIZE));
        assert!(sizes.len() >= 3);
    }

    #[tokio::test]
    async fn test_single_call_flushes_on_timer() {
        let recording = Arc::new(Recording::default());
        let batch = BatchClient::with_limits(recording.clone(), Duration::from_millis(10), 10);

        let started = std::time::Instant::now();
        let result = batch.call("seitech.skill", "search_read", json!([]), json!({})).await;

        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_millis(10));
        assert_eq!(*recording.sizes.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_failed_flush_rejects_every_caller() {
        let recording = Arc::new(Recording {
            sizes: Mutex::new(Vec::new()),
            fail: true,
        });
        let batch = BatchClient::spawn(recording);

        let (a, b) = tokio::join!(
            batch.call("a", "x", json!([]), json!({})),
            batch.call("b", "y", json!([]), json!({})),
        );

        assert!(matches!(a, Err(OdooError::InvalidCredentials)));
        assert!(matches!(b, Err(OdooError::InvalidCredentials)));
    }
}
