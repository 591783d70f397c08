//! Version catalog caching behavior across callers.

use warden::{CatalogError, ReleaseChannel, VersionCatalog};

use crate::common::{descriptor, StaticFetcher};

fn sample_catalog() -> VersionCatalog<StaticFetcher> {
    VersionCatalog::new(StaticFetcher::new(vec![
        descriptor("25w31a", ReleaseChannel::Snapshot),
        descriptor("1.21.8", ReleaseChannel::Release),
        descriptor("1.21.7", ReleaseChannel::Release),
    ]))
}

#[tokio::test]
async fn catalog_fetches_once_for_many_callers() {
    let catalog = sample_catalog();

    for _ in 0..5 {
        assert_eq!(catalog.versions().await.unwrap().len(), 3);
    }
    let (releases, found) = tokio::join!(catalog.releases(), catalog.find("1.21.7"));
    assert_eq!(releases.unwrap().len(), 2);
    assert_eq!(found.unwrap().id, "1.21.7");

    assert_eq!(catalog.fetcher().calls(), 1);
}

#[tokio::test]
async fn invalidation_resets_the_process_cache() {
    let catalog = sample_catalog();

    catalog.versions().await.unwrap();
    assert!(catalog.is_cached().await);

    catalog.invalidate().await;
    assert!(!catalog.is_cached().await);

    catalog.versions().await.unwrap();
    assert_eq!(catalog.fetcher().calls(), 2);
}

#[tokio::test]
async fn unknown_version_is_a_typed_error() {
    let catalog = sample_catalog();

    let err = catalog.find("1.8.9").await.unwrap_err();
    assert!(matches!(err, CatalogError::VersionNotFound(_)));
    assert_eq!(err.to_string(), "version not found: 1.8.9");
}
