//! Test utilities shared by the integration tests

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockito::{Mock, Server};
use xkcd_search::{Comic, ComicSource, FetchError, FetchResult, XkcdConfig};

/// Builds a comic with a predictable image URL
#[allow(dead_code)]
pub fn comic(num: u32, title: &str, alt: &str) -> Comic {
    Comic {
        num,
        title: title.to_string(),
        safe_title: title.to_string(),
        alt: alt.to_string(),
        img: format!("https://imgs.xkcd.com/comics/comic_{num}.png"),
        year: "2009".to_string(),
        month: "7".to_string(),
        day: "24".to_string(),
        ..Comic::default()
    }
}

/// Configuration pointing at `dir` with throttling disabled
#[allow(dead_code)]
pub fn test_config(dir: &Path) -> XkcdConfig {
    XkcdConfig::builder()
        .index_dir(dir)
        .rate_interval(Duration::ZERO)
        .build()
        .expect("test config is valid")
}

/// Serves `comic` as JSON at `path` on the mock server
#[allow(dead_code)]
pub async fn create_comic_mock(server: &mut Server, path: &str, comic: &Comic) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(comic).expect("comic serializes"))
        .create_async()
        .await
}

/// Creates a mock endpoint that returns an error status
#[allow(dead_code)]
pub async fn create_error_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body("Error")
        .create_async()
        .await
}

#[derive(Default)]
struct Inner {
    comics: Mutex<BTreeMap<u32, Comic>>,
    failing: Mutex<HashSet<u32>>,
    latest_fails: AtomicBool,
    delay: Mutex<Option<Duration>>,
    get_calls: AtomicUsize,
    latest_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// In-memory comic source with failure injection and call counters.
///
/// Clones share state, so a test can keep a handle after moving a clone
/// into the code under test.
#[derive(Clone, Default)]
pub struct MockSource {
    inner: Arc<Inner>,
}

#[allow(dead_code)]
impl MockSource {
    pub fn new(comics: impl IntoIterator<Item = Comic>) -> Self {
        let source = Self::default();
        for comic in comics {
            source.insert(comic);
        }
        source
    }

    /// Comics `1..=latest` (skipping 404) titled `Comic <n>`
    pub fn numbered(latest: u32) -> Self {
        Self::new(
            (1..=latest)
                .filter(|n| *n != 404)
                .map(|n| comic(n, &format!("Comic {n}"), "numbered test comic")),
        )
    }

    /// Add or replace a comic; the highest number is the latest
    pub fn insert(&self, comic: Comic) {
        self.inner.comics.lock().unwrap().insert(comic.num, comic);
    }

    pub fn fail_on(&self, num: u32) {
        self.inner.failing.lock().unwrap().insert(num);
    }

    pub fn clear_failures(&self) {
        self.inner.failing.lock().unwrap().clear();
    }

    pub fn set_latest_fails(&self, fails: bool) {
        self.inner.latest_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.lock().unwrap() = Some(delay);
    }

    pub fn get_calls(&self) -> usize {
        self.inner.get_calls.load(Ordering::SeqCst)
    }

    pub fn latest_calls(&self) -> usize {
        self.inner.latest_calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.inner.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl ComicSource for MockSource {
    async fn latest(&self) -> FetchResult<Comic> {
        self.inner.latest_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.latest_fails.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                status: 503,
                url: "mock://info.0.json".to_string(),
            });
        }
        self.inner
            .comics
            .lock()
            .unwrap()
            .values()
            .next_back()
            .cloned()
            .ok_or_else(|| FetchError::Other("no comics".to_string()))
    }

    async fn get(&self, num: u32) -> FetchResult<Comic> {
        self.inner.get_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.inner.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.inner.failing.lock().unwrap().contains(&num) {
            Err(FetchError::Status {
                status: 500,
                url: format!("mock://{num}/info.0.json"),
            })
        } else {
            self.inner
                .comics
                .lock()
                .unwrap()
                .get(&num)
                .cloned()
                .ok_or(FetchError::NotFound(num))
        };

        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
