//! End-to-end update and search behaviour against an in-memory comic source

mod common;

use common::{MockSource, comic, test_config};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use xkcd_search::{Error, Resolution, SearchError, XkcdSearch};

fn three_comics() -> MockSource {
    MockSource::new([
        comic(1, "Woodpecker", "If you don't have an extension cord I can get that too."),
        comic(2, "Exploits of a Mom", "Her daughter is named Help I'm trapped in a driver's license factory. Little Bobby Tables."),
        comic(3, "Compiling", "Are you stealing those LCDs? Yeah, but I'm doing it while my code compiles."),
    ])
}

#[tokio::test]
async fn search_finds_the_matching_comic() {
    let dir = TempDir::new().unwrap();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), three_comics());

    let report = xkcd.update().await.unwrap();
    assert_eq!(report.latest, 3);
    assert_eq!(report.total_documents, 3);
    assert!(report.failed.is_empty());

    let resolution = xkcd.search("bobby tables").await.unwrap();
    let Resolution::Found(hit) = &resolution else {
        panic!("expected a hit, got {resolution:?}");
    };
    assert_eq!(hit.num, 2);
    assert_eq!(hit.title, "Exploits of a Mom");
    assert_eq!(
        resolution.image_url(),
        Some("https://imgs.xkcd.com/comics/comic_2.png")
    );
}

#[tokio::test]
async fn unmatched_terms_are_not_found() {
    let dir = TempDir::new().unwrap();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), three_comics());
    xkcd.update().await.unwrap();

    let resolution = xkcd.search("nonexistent-term").await.unwrap();
    assert_eq!(resolution, Resolution::NotFound);
    assert_eq!(resolution.to_string(), "not found");
}

#[tokio::test]
async fn punctuation_only_terms_are_not_found() {
    let dir = TempDir::new().unwrap();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), three_comics());

    assert_eq!(xkcd.search("?!").await.unwrap(), Resolution::NotFound);
}

#[tokio::test]
async fn search_on_fresh_instance_updates_first() {
    let dir = TempDir::new().unwrap();
    let source = three_comics();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());
    assert!(!xkcd.is_ready());

    let resolution = xkcd.search("woodpecker").await.unwrap();

    assert!(xkcd.is_ready());
    assert_eq!(resolution.hit().map(|hit| hit.num), Some(1));
    assert_eq!(source.latest_calls(), 1);
    // The latest comic comes with the latest lookup and is not requested again.
    assert_eq!(source.get_calls(), 2);
}

#[tokio::test]
async fn search_on_ready_instance_does_not_contact_source() {
    let dir = TempDir::new().unwrap();
    let source = three_comics();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());
    xkcd.update().await.unwrap();

    xkcd.search("compiling").await.unwrap();
    xkcd.search("woodpecker").await.unwrap();

    assert_eq!(source.latest_calls(), 1);
    assert_eq!(source.get_calls(), 2);
}

#[tokio::test]
async fn second_update_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let source = three_comics();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());

    xkcd.update().await.unwrap();
    let calls_after_first = source.get_calls();

    let report = xkcd.update().await.unwrap();
    assert_eq!(report.already_indexed, 3);
    assert_eq!(report.planned, 0);
    assert_eq!(report.fetched, 0);
    assert_eq!(report.indexed, 0);
    assert_eq!(report.total_documents, 3);
    assert_eq!(source.get_calls(), calls_after_first);
}

#[tokio::test]
async fn update_picks_up_new_comics_only() {
    let dir = TempDir::new().unwrap();
    let source = three_comics();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());
    xkcd.update().await.unwrap();

    source.insert(comic(4, "Tech Support Cheat Sheet", "Menu items, clicking around."));
    source.insert(comic(5, "Sandwich", "Proper User Policy apparently means Simon Says."));

    let report = xkcd.update().await.unwrap();
    assert_eq!(report.latest, 5);
    assert_eq!(report.planned, 2);
    assert_eq!(report.indexed, 2);
    assert_eq!(report.total_documents, 5);
    // Only comic 4 had to be requested; 5 arrived with the latest lookup.
    assert_eq!(source.get_calls(), 3);

    let hit = xkcd.search("sandwich").await.unwrap();
    assert_eq!(hit.hit().map(|h| h.num), Some(5));
}

#[tokio::test]
async fn failed_comic_is_skipped_and_retried_next_time() {
    let dir = TempDir::new().unwrap();
    let source = MockSource::numbered(100);
    source.fail_on(57);
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());

    let report = xkcd.update().await.unwrap();
    assert_eq!(report.failed, vec![57]);
    assert_eq!(report.total_documents, 99);
    assert!(!report.cancelled);

    source.clear_failures();
    let report = xkcd.update().await.unwrap();
    assert_eq!(report.planned, 1);
    assert!(report.failed.is_empty());
    assert_eq!(report.total_documents, 100);
}

#[tokio::test]
async fn comic_404_is_never_requested() {
    let dir = TempDir::new().unwrap();
    let source = MockSource::numbered(405);
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());

    let report = xkcd.update().await.unwrap();
    assert_eq!(report.planned, 404);
    assert!(report.failed.is_empty());
    assert_eq!(report.total_documents, 404);
    assert_eq!(source.get_calls(), 403);
}

#[tokio::test]
async fn unreachable_source_fails_update_without_touching_index() {
    let dir = TempDir::new().unwrap();
    let index_dir = dir.path().join("index");
    let source = three_comics();
    source.set_latest_fails(true);
    let mut xkcd = XkcdSearch::with_source(test_config(&index_dir), source.clone());

    let err = xkcd.update().await.unwrap_err();
    assert!(matches!(err, Error::RemoteUnavailable(_)));
    assert!(!xkcd.is_ready());
    assert!(!index_dir.exists());
    assert_eq!(source.get_calls(), 0);

    let err = xkcd.search("woodpecker").await.unwrap_err();
    assert!(matches!(err, Error::RemoteUnavailable(_)));
}

#[tokio::test]
async fn index_survives_a_new_instance() {
    let dir = TempDir::new().unwrap();
    {
        let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), three_comics());
        xkcd.update().await.unwrap();
    }

    let source = three_comics();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());
    let report = xkcd.update().await.unwrap();

    assert_eq!(report.already_indexed, 3);
    assert_eq!(report.planned, 0);
    assert_eq!(source.get_calls(), 0);
    assert_eq!(xkcd.search("compiling").await.unwrap().hit().map(|h| h.num), Some(3));
}

#[tokio::test]
async fn cancelled_update_still_commits_the_latest_comic() {
    let dir = TempDir::new().unwrap();
    let source = MockSource::numbered(20);
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = xkcd.update_with_cancel(&cancel).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.failed.len(), 19);
    assert_eq!(report.total_documents, 1);
    assert_eq!(source.get_calls(), 0);
    assert!(xkcd.is_ready());

    let report = xkcd.update().await.unwrap();
    assert_eq!(report.planned, 19);
    assert_eq!(report.total_documents, 20);
}

#[tokio::test]
async fn comic_without_image_is_an_integrity_error() {
    let dir = TempDir::new().unwrap();
    let mut broken = comic(1, "Barrel - Part 1", "Don't we all.");
    broken.img.clear();
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), MockSource::new([broken]));

    let err = xkcd.search("barrel").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Store(SearchError::MissingField { field: "img", num: 1 })
    ));
}

#[tokio::test]
async fn unusable_index_dir_fails_update_and_search() {
    let dir = TempDir::new().unwrap();
    let index_dir = dir.path().join("index");
    std::fs::write(&index_dir, b"not a directory").unwrap();
    let source = three_comics();
    let mut xkcd = XkcdSearch::with_source(test_config(&index_dir), source.clone());

    let err = xkcd.update().await.unwrap_err();
    assert!(matches!(err, Error::Store(SearchError::IndexOpen(_))), "unexpected error: {err:?}");
    assert!(!xkcd.is_ready());
    assert_eq!(source.get_calls(), 0);

    let err = xkcd.search("woodpecker").await.unwrap_err();
    assert!(matches!(err, Error::Store(SearchError::IndexOpen(_))), "unexpected error: {err:?}");
    assert!(!xkcd.is_ready());
}

#[tokio::test]
async fn locked_index_fails_the_commit_until_released() {
    let dir = TempDir::new().unwrap();
    {
        let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), three_comics());
        xkcd.update().await.unwrap();
    }

    let foreign_writer: tantivy::IndexWriter = tantivy::Index::open_in_dir(dir.path())
        .unwrap()
        .writer(20_000_000)
        .unwrap();

    let source = three_comics();
    source.insert(comic(4, "Landscape (sketch)", "There's a river flowing through the ocean."));
    let mut xkcd = XkcdSearch::with_source(test_config(dir.path()), source.clone());

    let err = xkcd.update().await.unwrap_err();
    assert!(
        matches!(err, Error::Store(SearchError::WriterAcquisition(_))),
        "unexpected error: {err:?}"
    );
    assert!(!xkcd.is_ready());

    drop(foreign_writer);
    let report = xkcd.update().await.unwrap();
    assert_eq!(report.total_documents, 4);
    assert!(xkcd.is_ready());
}
