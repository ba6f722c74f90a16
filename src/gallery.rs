//! Gallery collection - one page of photos at a time
//!
//! `fetch(page)` replaces the whole collection with the page the server sends
//! back and broadcasts the new pagination state. Nothing is merged or diffed.
//!
//! # Overlapping fetches
//!
//! Every fetch takes a sequence number when it is issued. With
//! [`StaleResponses::Discard`] (the default) an answer that arrives after a
//! newer fetch was issued is dropped, so the collection always shows the
//! latest *requested* page. [`StaleResponses::Apply`] keeps the plain
//! last-arrival-wins behavior.

use crate::events::{CollectionEvent, PageInfo};
use crate::reporter::ErrorReporter;
use crate::request::Transport;
use crate::util::stringify;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

pub const GALLERY_FAILED_TITLE: &str = "Не смог загрузить галлерею";

/// Buffered events per observer before the slowest one starts lagging
const EVENT_CAPACITY: usize = 64;

/// A photo as listed in the gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: i64,
    /// "jpg" or "png"
    #[serde(rename = "type")]
    pub image_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub name: Option<String>,
    pub iso: Option<u32>,
    pub shutter: Option<i32>,
    pub aperture: Option<f32>,
    pub focal_length: Option<u16>,
    pub focal_length_35mm: Option<u16>,
    pub camera_model: Option<String>,
}

impl PhotoRecord {
    /// Human-readable label: name if set, otherwise the id
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("#{}", self.id),
        }
    }
}

/// Body of a good `/gallery` answer
#[derive(Debug, Deserialize)]
struct GalleryPage {
    photos: Vec<PhotoRecord>,
    pages_count: u32,
    current_page: u32,
}

/// What to do with an answer that lost the race to a newer fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleResponses {
    /// Drop it; only the latest issued fetch may touch the collection
    #[default]
    Discard,
    /// Apply answers in arrival order
    Apply,
}

/// Result of one `fetch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Collection now holds this page
    Loaded(PageInfo),
    /// A newer fetch was issued before this one resolved
    Superseded,
    /// Request failed and was reported
    Failed,
}

/// Observable, ordered list of photo records
pub struct GalleryCollection<T, R> {
    transport: T,
    reporter: R,
    photos: Mutex<Vec<PhotoRecord>>,
    events: broadcast::Sender<CollectionEvent>,
    issued: AtomicU64,
    stale: StaleResponses,
}

impl<T: Transport, R: ErrorReporter> GalleryCollection<T, R> {
    pub fn new(transport: T, reporter: R) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            reporter,
            photos: Mutex::new(Vec::new()),
            events,
            issued: AtomicU64::new(0),
            stale: StaleResponses::default(),
        }
    }

    pub fn with_stale_responses(mut self, stale: StaleResponses) -> Self {
        self.stale = stale;
        self
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current contents
    pub fn photos(&self) -> Vec<PhotoRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Load `page` from the server, replacing the current contents
    pub async fn fetch(&self, page: u32) -> FetchOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Fetching gallery page {} (request #{})", page, seq);

        let answer = self
            .transport
            .get("/gallery", &[("page", page.to_string())])
            .await;

        // Cheap early exit; a superseded failure is never reported
        if self.is_stale(seq) {
            return self.superseded(seq, page);
        }

        let data: GalleryPage = match answer.decode() {
            Ok(data) => data,
            Err(payload) => {
                self.reporter.oops(GALLERY_FAILED_TITLE, &stringify(&payload));
                return FetchOutcome::Failed;
            }
        };

        let pages = PageInfo {
            pages_count: data.pages_count,
            current_page: data.current_page,
        };

        // Staleness is re-checked under the lock that guards the write, and
        // events go out before it is released so they follow commit order.
        let len = {
            let mut photos = self.lock();
            if self.is_stale(seq) {
                drop(photos);
                return self.superseded(seq, page);
            }
            photos.clear();
            photos.extend(data.photos);

            // No observers is fine
            let _ = self.events.send(CollectionEvent::reset(photos.len()));
            let _ = self.events.send(CollectionEvent::pages_changed(pages));
            photos.len()
        };

        tracing::info!(
            "Gallery page {}/{} loaded ({} photos)",
            pages.current_page,
            pages.pages_count,
            len
        );
        FetchOutcome::Loaded(pages)
    }

    fn superseded(&self, seq: u64, page: u32) -> FetchOutcome {
        tracing::debug!(
            "Dropping gallery answer #{} for page {}, newer request pending",
            seq,
            page
        );
        FetchOutcome::Superseded
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.stale == StaleResponses::Discard && self.issued.load(Ordering::SeqCst) != seq
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PhotoRecord>> {
        self.photos.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::ReportLog;
    use crate::request::Answer;
    use crate::testing::ScriptedTransport;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::broadcast::error::TryRecvError;

    type Collection = GalleryCollection<Arc<ScriptedTransport>, ReportLog>;

    fn photo(id: i64) -> Value {
        json!({"id": id, "type": "jpg", "width": 800, "height": 600, "name": format!("p{}", id)})
    }

    fn page(ids: &[i64], pages_count: u32, current_page: u32) -> Answer {
        Answer::Good(json!({
            "photos": ids.iter().map(|&id| photo(id)).collect::<Vec<_>>(),
            "pages_count": pages_count,
            "current_page": current_page,
        }))
    }

    fn ids(collection: &Collection) -> Vec<i64> {
        collection.photos().iter().map(|p| p.id).collect()
    }

    fn drain(rx: &mut broadcast::Receiver<CollectionEvent>) -> Vec<CollectionEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
    }

    fn pages_changed(events: &[CollectionEvent]) -> Vec<PageInfo> {
        events.iter().filter_map(|e| e.pages()).collect()
    }

    #[test]
    fn test_photo_record_tolerates_sparse_metadata() {
        let record: PhotoRecord =
            serde_json::from_value(json!({"id": 7, "camera_model": "X100", "extra": 1})).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.camera_model.as_deref(), Some("X100"));
        assert_eq!(record.width, None);
        assert_eq!(record.label(), "#7");
    }

    #[tokio::test]
    async fn test_fetch_replaces_contents_and_emits_pages_changed() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .answer(page(&[10, 11, 12], 5, 4))
                .answer(page(&[1, 2], 3, 1)),
        );
        let reports = ReportLog::new();
        let collection = GalleryCollection::new(transport.clone(), reports.clone());

        collection.fetch(4).await;
        let mut rx = collection.subscribe();
        let outcome = collection.fetch(1).await;

        assert_eq!(
            outcome,
            FetchOutcome::Loaded(PageInfo {
                pages_count: 3,
                current_page: 1
            })
        );
        // Prior contents discarded, order preserved
        assert_eq!(ids(&collection), vec![1, 2]);

        let events = drain(&mut rx);
        assert_eq!(
            pages_changed(&events),
            vec![PageInfo {
                pages_count: 3,
                current_page: 1
            }]
        );
        assert!(reports.is_empty());

        let calls = transport.calls();
        assert_eq!(calls[1].path, "/gallery");
        assert_eq!(calls[1].params, vec![("page".to_string(), "1".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_contents_and_reports_payload() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .answer(page(&[1, 2], 3, 1))
                .answer(Answer::Bad(json!({"error": "db"}))),
        );
        let reports = ReportLog::new();
        let collection = GalleryCollection::new(transport, reports.clone());

        collection.fetch(1).await;
        let mut rx = collection.subscribe();
        let outcome = collection.fetch(2).await;

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(ids(&collection), vec![1, 2]);
        assert!(drain(&mut rx).is_empty());

        let reports = reports.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].title, "Не смог загрузить галлерею");
        assert_eq!(reports[0].message, r#"{"error":"db"}"#);
    }

    #[tokio::test]
    async fn test_malformed_good_answer_is_a_failure() {
        let transport = Arc::new(
            ScriptedTransport::new().answer(Answer::Good(json!({"pages_count": 1}))),
        );
        let reports = ReportLog::new();
        let collection = GalleryCollection::new(transport, reports.clone());

        assert_eq!(collection.fetch(1).await, FetchOutcome::Failed);
        assert!(collection.is_empty());
        assert_eq!(reports.reports()[0].message, r#"{"pages_count":1}"#);
    }

    #[tokio::test]
    async fn test_empty_page_clears_collection() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .answer(page(&[1, 2], 2, 1))
                .answer(page(&[], 2, 2)),
        );
        let collection = GalleryCollection::new(transport, ReportLog::new());

        collection.fetch(1).await;
        collection.fetch(2).await;

        assert!(collection.is_empty());
        assert_eq!(collection.len(), 0);
    }

    /// Issue fetch(1) then fetch(2), release page 2's answer first.
    async fn race(stale: StaleResponses) -> (Arc<Collection>, FetchOutcome, FetchOutcome, Vec<PageInfo>) {
        let transport = Arc::new(ScriptedTransport::new());
        let first = transport.deferred();
        let second = transport.deferred();
        let collection = Arc::new(
            GalleryCollection::new(transport.clone(), ReportLog::new()).with_stale_responses(stale),
        );
        let mut rx = collection.subscribe();

        let c = collection.clone();
        let h1 = tokio::spawn(async move { c.fetch(1).await });
        transport.wait_for_calls(1).await;
        let c = collection.clone();
        let h2 = tokio::spawn(async move { c.fetch(2).await });
        transport.wait_for_calls(2).await;

        second.send(page(&[20, 21], 2, 2)).unwrap();
        let o2 = h2.await.unwrap();
        first.send(page(&[10, 11], 2, 1)).unwrap();
        let o1 = h1.await.unwrap();

        let pages = pages_changed(&drain(&mut rx));
        (collection, o1, o2, pages)
    }

    #[tokio::test]
    async fn test_overlapping_fetches_apply_in_arrival_order_without_guard() {
        // Known gap: without the guard the earlier request's late answer wins
        let (collection, o1, o2, pages) = race(StaleResponses::Apply).await;

        assert!(matches!(o1, FetchOutcome::Loaded(_)));
        assert!(matches!(o2, FetchOutcome::Loaded(_)));
        assert_eq!(ids(&collection), vec![10, 11]);
        assert_eq!(
            pages.iter().map(|p| p.current_page).collect::<Vec<_>>(),
            vec![2, 1]
        );
    }

    #[tokio::test]
    async fn test_overlapping_fetches_keep_latest_request_with_guard() {
        let (collection, o1, o2, pages) = race(StaleResponses::Discard).await;

        assert_eq!(o1, FetchOutcome::Superseded);
        assert!(matches!(o2, FetchOutcome::Loaded(_)));
        assert_eq!(ids(&collection), vec![20, 21]);
        assert_eq!(
            pages.iter().map(|p| p.current_page).collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[tokio::test]
    async fn test_stale_failure_is_not_reported() {
        let transport = Arc::new(ScriptedTransport::new());
        let first = transport.deferred();
        let second = transport.deferred();
        let reports = ReportLog::new();
        let collection = Arc::new(GalleryCollection::new(transport.clone(), reports.clone()));

        let c = collection.clone();
        let h1 = tokio::spawn(async move { c.fetch(1).await });
        transport.wait_for_calls(1).await;
        let c = collection.clone();
        let h2 = tokio::spawn(async move { c.fetch(2).await });
        transport.wait_for_calls(2).await;

        first.send(Answer::Bad(json!("timeout"))).unwrap();
        assert_eq!(h1.await.unwrap(), FetchOutcome::Superseded);
        second.send(page(&[5], 1, 1)).unwrap();
        assert!(matches!(h2.await.unwrap(), FetchOutcome::Loaded(_)));

        assert!(reports.is_empty());
        assert_eq!(ids(&collection), vec![5]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_slow_decode_of_older_page_never_overwrites_newer() {
        let big: Vec<i64> = (1000..6000).collect();

        for _ in 0..30 {
            let transport = ScriptedTransport::new();
            let first = transport.deferred();
            let transport = Arc::new(transport.answer(page(&[2], 2, 2)));
            let collection = Arc::new(GalleryCollection::new(transport.clone(), ReportLog::new()));
            let mut rx = collection.subscribe();

            let c = collection.clone();
            let h1 = tokio::spawn(async move { c.fetch(1).await });
            transport.wait_for_calls(1).await;

            // Page 1 starts decoding while page 2 is issued and applied
            first.send(page(&big, 2, 1)).unwrap();
            let c = collection.clone();
            let h2 = tokio::spawn(async move { c.fetch(2).await });

            let o1 = h1.await.unwrap();
            let o2 = h2.await.unwrap();

            assert!(matches!(o2, FetchOutcome::Loaded(_)));
            assert!(matches!(o1, FetchOutcome::Loaded(_) | FetchOutcome::Superseded));
            assert_eq!(ids(&collection), vec![2]);
            let pages = pages_changed(&drain(&mut rx));
            assert_eq!(pages.last().map(|p| p.current_page), Some(2));
        }
    }
}
