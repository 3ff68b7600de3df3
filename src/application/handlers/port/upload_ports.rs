//! UploadPortsHandler - Streams a bulk upload into the repository.
//!
//! A run moves `Idle -> Streaming -> {Completed | Aborted | Cancelled}`.
//! While streaming, a spawned producer task decodes fragments and hands them
//! over a capacity-1 channel to the caller's task, which validates and saves
//! each one as it arrives. The producer reserves the channel slot before it
//! decodes, so while entry N is being committed at most entry N+1 has been
//! decoded. Memory use does not depend on payload size.
//!
//! Records are committed one at a time. A failure on record N leaves
//! records 1..N-1 in place and stops the run; nothing after N is attempted.

use std::fmt::Display;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::fragment_decoder::{FragmentDecoder, PortFragment};
use crate::domain::port::PortError;
use crate::ports::PortRepository;

/// Default cap on the number of bytes read from one upload (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Result of a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub committed: usize,
}

/// Failed upload, with the number of ports saved before the failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error} ({committed} ports committed before the failure)")]
pub struct UploadError {
    pub committed: usize,
    #[source]
    pub error: PortError,
}

impl UploadError {
    fn new(committed: usize, error: PortError) -> Self {
        Self { committed, error }
    }
}

/// Handler for bulk port uploads.
pub struct UploadPortsHandler {
    repository: Arc<dyn PortRepository>,
    max_bytes: u64,
}

impl UploadPortsHandler {
    pub fn new(repository: Arc<dyn PortRepository>) -> Self {
        Self {
            repository,
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the byte cap applied to each upload.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Decode `body` and save every port it contains.
    ///
    /// `cancel` requests cancellation when its value becomes `true`. A
    /// receiver whose sender is gone never cancels.
    ///
    /// # Errors
    ///
    /// - `MalformedInput` / `PayloadTooLarge` from the decoder
    /// - `ValidationFailed` if an entry lacks a required field
    /// - `Cancelled` if `cancel` fired first
    /// - `Infrastructure` if the repository rejected a write
    pub async fn handle<S, B, E>(
        &self,
        body: S,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<UploadSummary, UploadError>
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Display + Send + 'static,
    {
        if *cancel.borrow() {
            return Err(UploadError::new(0, PortError::cancelled()));
        }

        let decoder = FragmentDecoder::new(Box::pin(body)).with_limit(self.max_bytes);
        let (fragment_tx, mut fragment_rx) = mpsc::channel(1);
        let mut producer = tokio::spawn(produce_fragments(decoder, fragment_tx));
        let mut committed = 0usize;

        tracing::debug!(max_bytes = self.max_bytes, "Upload started");

        loop {
            tokio::select! {
                biased;

                _ = cancelled(&mut cancel) => {
                    release(fragment_rx, producer).await;
                    tracing::info!(committed, "Upload cancelled");
                    return Err(UploadError::new(committed, PortError::cancelled()));
                }

                Some(fragment) = fragment_rx.recv() => {
                    if let Err(error) = self.commit(fragment).await {
                        release(fragment_rx, producer).await;
                        tracing::info!(committed, %error, "Upload aborted");
                        return Err(UploadError::new(committed, error));
                    }
                    committed += 1;
                }

                outcome = &mut producer => {
                    // Fragments sent before the producer finished may still be queued.
                    while let Some(fragment) = fragment_rx.recv().await {
                        if let Err(error) = self.commit(fragment).await {
                            tracing::info!(committed, %error, "Upload aborted");
                            return Err(UploadError::new(committed, error));
                        }
                        committed += 1;
                    }

                    let error = match outcome {
                        Ok(Ok(())) => {
                            tracing::info!(committed, "Upload completed");
                            return Ok(UploadSummary { committed });
                        }
                        Ok(Err(error)) => error,
                        Err(join_error) => {
                            PortError::infrastructure(format!("decode task failed: {}", join_error))
                        }
                    };
                    tracing::info!(committed, %error, "Upload aborted");
                    return Err(UploadError::new(committed, error));
                }
            }
        }
    }

    async fn commit(&self, fragment: PortFragment) -> Result<(), PortError> {
        let id = fragment.id.clone();
        let port = fragment.into_port().map_err(|e| {
            tracing::warn!(port_id = %id, error = %e, "Rejected invalid port");
            PortError::validation(e.field(), format!("entry '{}': {}", id, e))
        })?;

        self.repository.save(&port).await.map_err(|e| {
            tracing::error!(port_id = %id, error = %e, "Failed to save port");
            PortError::from(e)
        })
    }
}

/// Resolves once `cancel` holds `true`; pends forever if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Closes the handoff channel and stops the producer before returning.
async fn release(
    fragment_rx: mpsc::Receiver<PortFragment>,
    producer: JoinHandle<Result<(), PortError>>,
) {
    drop(fragment_rx);
    producer.abort();
    let _ = producer.await;
}

/// Producer task: decodes fragments and hands them over one at a time.
///
/// A fragment is decoded only once the channel has room for it. Stops as
/// soon as the consumer drops its receiver, even mid-read.
async fn produce_fragments<S, B, E>(
    mut decoder: FragmentDecoder<S>,
    fragments: mpsc::Sender<PortFragment>,
) -> Result<(), PortError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    loop {
        let permit = match fragments.reserve().await {
            Ok(permit) => permit,
            Err(_) => return Err(PortError::cancelled()),
        };
        let next = tokio::select! {
            _ = fragments.closed() => return Err(PortError::cancelled()),
            next = decoder.next_fragment() => next?,
        };
        match next {
            Some(fragment) => permit.send(fragment),
            None => {
                tracing::debug!(bytes_read = decoder.bytes_read(), "Upload payload decoded");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryPortRepository;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::domain::port::Port;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream, StreamExt};
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use std::time::Duration;

    type Chunk = Result<Vec<u8>, String>;

    fn entry(id: &str) -> String {
        format!(
            r#""{id}": {{"name": "Port {id}", "city": "City {id}", "country": "Country", "coordinates": [1.5, 2.5], "unlocs": ["{id}"]}}"#
        )
    }

    fn payload(entries: &[String]) -> String {
        format!("{{{}}}", entries.join(","))
    }

    fn body(payload: String) -> BoxStream<'static, Chunk> {
        let parts: Vec<Chunk> = payload
            .into_bytes()
            .chunks(512)
            .map(|c| Ok(c.to_vec()))
            .collect();
        stream::iter(parts).boxed()
    }

    /// A body that delivers `prefix` and then never ends.
    fn stalled_body(prefix: String) -> BoxStream<'static, Chunk> {
        stream::iter(vec![Ok(prefix.into_bytes())])
            .chain(stream::pending())
            .boxed()
    }

    /// Wraps a body and records when it is dropped.
    struct DropFlag {
        inner: BoxStream<'static, Chunk>,
        dropped: Arc<AtomicBool>,
    }

    impl Stream for DropFlag {
        type Item = Chunk;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Chunk>> {
            self.inner.as_mut().poll_next(cx)
        }
    }

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn not_cancelled() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    fn setup() -> (Arc<InMemoryPortRepository>, UploadPortsHandler) {
        let repo = Arc::new(InMemoryPortRepository::new());
        let handler = UploadPortsHandler::new(repo.clone());
        (repo, handler)
    }

    async fn wait_for_count(repo: &InMemoryPortRepository, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while repo.count().await.unwrap() < expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("ports were not committed in time");
    }

    struct FailingRepository;

    #[async_trait]
    impl PortRepository for FailingRepository {
        async fn save(&self, _port: &Port) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::StoreUnavailable, "store closed"))
        }

        async fn update(&self, _port: &Port) -> Result<bool, DomainError> {
            Err(DomainError::new(ErrorCode::StoreUnavailable, "store closed"))
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<Port>, DomainError> {
            Ok(None)
        }

        async fn find_all(&self) -> Result<Vec<Port>, DomainError> {
            Ok(vec![])
        }

        async fn count(&self) -> Result<usize, DomainError> {
            Ok(0)
        }

        async fn delete(&self, _id: &str) -> Result<Option<Port>, DomainError> {
            Ok(None)
        }
    }

    /// Counts saves and never finishes one.
    #[derive(Default)]
    struct StalledRepository {
        saves: AtomicUsize,
    }

    #[async_trait]
    impl PortRepository for StalledRepository {
        async fn save(&self, _port: &Port) -> Result<(), DomainError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }

        async fn update(&self, _port: &Port) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<Port>, DomainError> {
            Ok(None)
        }

        async fn find_all(&self) -> Result<Vec<Port>, DomainError> {
            Ok(vec![])
        }

        async fn count(&self) -> Result<usize, DomainError> {
            Ok(0)
        }

        async fn delete(&self, _id: &str) -> Result<Option<Port>, DomainError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn commits_every_valid_entry() {
        let (repo, handler) = setup();
        let (_tx, cancel) = not_cancelled();
        let entries: Vec<_> = ["AEAJM", "AEAUH", "AEDXB"].iter().map(|id| entry(id)).collect();

        let summary = handler.handle(body(payload(&entries)), cancel).await.unwrap();

        assert_eq!(summary.committed, 3);
        assert_eq!(repo.count().await.unwrap(), 3);
        let port = repo.find_by_id("AEDXB").await.unwrap().unwrap();
        assert_eq!(port.name(), "Port AEDXB");
        assert_eq!(port.coordinates(), [1.5, 2.5]);
    }

    #[tokio::test]
    async fn empty_object_commits_nothing() {
        let (repo, handler) = setup();
        let (_tx, cancel) = not_cancelled();

        let summary = handler.handle(body("{}".to_string()), cancel).await.unwrap();

        assert_eq!(summary.committed, 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn commits_large_payload() {
        let (repo, handler) = setup();
        let (_tx, cancel) = not_cancelled();
        let entries: Vec<_> = (0..10_000).map(|i| entry(&format!("P{:05}", i))).collect();

        let summary = handler.handle(body(payload(&entries)), cancel).await.unwrap();

        assert_eq!(summary.committed, 10_000);
        assert_eq!(repo.count().await.unwrap(), 10_000);
    }

    #[tokio::test]
    async fn invalid_entry_keeps_earlier_commits_and_stops() {
        let (repo, handler) = setup();
        let (_tx, cancel) = not_cancelled();
        let entries = vec![
            entry("A"),
            entry("B"),
            r#""C": {"name": "Port C", "country": "Country"}"#.to_string(),
            entry("D"),
            entry("E"),
        ];

        let err = handler.handle(body(payload(&entries)), cancel).await.unwrap_err();

        assert_eq!(err.committed, 2);
        assert!(matches!(
            err.error,
            PortError::ValidationFailed { ref field, .. } if field == "port city"
        ));
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(repo.find_by_id("A").await.unwrap().is_some());
        assert!(repo.find_by_id("B").await.unwrap().is_some());
        assert!(repo.find_by_id("D").await.unwrap().is_none());
        assert!(repo.find_by_id("E").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_entry_keeps_earlier_commits() {
        let (repo, handler) = setup();
        let (_tx, cancel) = not_cancelled();
        let entries = vec![
            entry("A"),
            entry("B"),
            r#""C": {"name": 42}"#.to_string(),
            entry("D"),
        ];

        let err = handler.handle(body(payload(&entries)), cancel).await.unwrap_err();

        assert_eq!(err.committed, 2);
        assert!(matches!(err.error, PortError::MalformedInput(_)));
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(repo.find_by_id("D").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_payload_commits_nothing() {
        let (repo, handler) = setup();
        let (_tx, cancel) = not_cancelled();

        let err = handler
            .handle(body("notjson".to_string()), cancel)
            .await
            .unwrap_err();

        assert_eq!(err.committed, 0);
        assert!(matches!(err.error, PortError::MalformedInput(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn truncated_payload_reports_committed_count() {
        let (repo, handler) = setup();
        let (_tx, cancel) = not_cancelled();
        let truncated = format!("{{{},{}", entry("A"), entry("B"));

        let err = handler.handle(body(truncated), cancel).await.unwrap_err();

        assert_eq!(err.committed, 2);
        assert!(matches!(err.error, PortError::MalformedInput(_)));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected() {
        let repo = Arc::new(InMemoryPortRepository::new());
        let handler = UploadPortsHandler::new(repo.clone()).with_max_bytes(1024);
        let (_tx, cancel) = not_cancelled();
        let entries: Vec<_> = (0..100).map(|i| entry(&format!("P{}", i))).collect();

        let err = handler.handle(body(payload(&entries)), cancel).await.unwrap_err();

        assert_eq!(err.error, PortError::payload_too_large(1024));
        assert!(err.committed < 100);
        assert_eq!(repo.count().await.unwrap(), err.committed);
    }

    #[tokio::test]
    async fn already_cancelled_commits_nothing() {
        let (repo, handler) = setup();
        let (_tx, cancel) = watch::channel(true);

        let err = handler
            .handle(body(payload(&[entry("A")])), cancel)
            .await
            .unwrap_err();

        assert_eq!(err, UploadError::new(0, PortError::Cancelled));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancellation_mid_upload_keeps_committed_ports_and_releases_producer() {
        let (repo, handler) = setup();
        let handler = Arc::new(handler);
        let (cancel_tx, cancel) = not_cancelled();
        let dropped = Arc::new(AtomicBool::new(false));
        let prefix = format!("{{{},{},", entry("A"), entry("B"));
        let body = DropFlag {
            inner: stalled_body(prefix),
            dropped: dropped.clone(),
        };

        let task = {
            let handler = handler.clone();
            tokio::spawn(async move { handler.handle(body, cancel).await })
        };

        wait_for_count(&repo, 2).await;
        cancel_tx.send(true).unwrap();
        let err = task.await.unwrap().unwrap_err();

        assert_eq!(err, UploadError::new(2, PortError::Cancelled));
        assert!(dropped.load(Ordering::SeqCst), "producer still owns the body");
        let mut ids: Vec<_> = repo
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn producer_decodes_at_most_one_entry_ahead_of_commit() {
        let repo = Arc::new(StalledRepository::default());
        let handler = Arc::new(UploadPortsHandler::new(repo.clone()));
        let (_tx, cancel) = not_cancelled();
        let pulled = Arc::new(AtomicUsize::new(0));

        // One chunk per entry, so chunks pulled equals entries decoded.
        let mut chunks: Vec<Chunk> = (0..6)
            .map(|i| {
                let sep = if i == 0 { "{" } else { "," };
                Ok(format!("{}{}", sep, entry(&format!("P{}", i))).into_bytes())
            })
            .collect();
        chunks.push(Ok(b"}".to_vec()));
        let counter = pulled.clone();
        let body = stream::iter(chunks).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let task = {
            let handler = handler.clone();
            tokio::spawn(async move { handler.handle(body, cancel).await })
        };

        tokio::time::timeout(Duration::from_secs(5), async {
            while repo.saves.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("first save never started");
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(repo.saves.load(Ordering::SeqCst), 1);
        assert!(
            pulled.load(Ordering::SeqCst) <= 2,
            "decoded {} entries while the first was being committed",
            pulled.load(Ordering::SeqCst)
        );
        task.abort();
    }

    #[tokio::test]
    async fn validation_failure_releases_producer() {
        let (_repo, handler) = setup();
        let (_tx, cancel) = not_cancelled();
        let dropped = Arc::new(AtomicBool::new(false));
        let prefix = r#"{"A": {"name": "Port A"},"#.to_string();
        let body = DropFlag {
            inner: stalled_body(prefix),
            dropped: dropped.clone(),
        };

        let err = handler.handle(body, cancel).await.unwrap_err();

        assert_eq!(err.committed, 0);
        assert!(matches!(err.error, PortError::ValidationFailed { .. }));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dropped_cancel_sender_does_not_cancel() {
        let (repo, handler) = setup();
        let (tx, cancel) = not_cancelled();
        drop(tx);

        let summary = handler
            .handle(body(payload(&[entry("A"), entry("B")])), cancel)
            .await
            .unwrap();

        assert_eq!(summary.committed, 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn repository_failure_aborts_upload() {
        let handler = UploadPortsHandler::new(Arc::new(FailingRepository));
        let (_tx, cancel) = not_cancelled();

        let err = handler
            .handle(body(payload(&[entry("A"), entry("B")])), cancel)
            .await
            .unwrap_err();

        assert_eq!(err.committed, 0);
        assert!(matches!(err.error, PortError::Infrastructure(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_uploads_on_distinct_keys_lose_nothing() {
        let repo = Arc::new(InMemoryPortRepository::new());
        let (_tx, cancel) = not_cancelled();

        let mut tasks = Vec::new();
        for run in 0..4 {
            let handler = UploadPortsHandler::new(repo.clone());
            let cancel = cancel.clone();
            let entries: Vec<_> = (0..250).map(|i| entry(&format!("R{}-{}", run, i))).collect();
            tasks.push(tokio::spawn(async move {
                handler.handle(body(payload(&entries)), cancel).await
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().committed, 250);
        }

        assert_eq!(repo.count().await.unwrap(), 1000);
        assert_eq!(repo.find_all().await.unwrap().len(), 1000);
    }

    #[test]
    fn upload_error_display_includes_count() {
        let err = UploadError::new(3, PortError::malformed("unexpected end of input"));
        assert_eq!(
            err.to_string(),
            "Malformed input: unexpected end of input (3 ports committed before the failure)"
        );
    }
}
