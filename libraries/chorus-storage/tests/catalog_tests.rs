//! Track catalog integration tests

mod test_helpers;

use chorus_core::types::{TrackMetadata, TrackSource};
use chorus_storage::{NewTrackSource, TrackCatalog};
use test_helpers::TestStore;

fn bytes_source(file_name: &str) -> NewTrackSource {
    NewTrackSource::Bytes {
        bytes: vec![1u8; 256],
        file_name: file_name.to_string(),
    }
}

#[tokio::test]
async fn create_from_bytes_shares_id_with_blob() {
    let test = TestStore::new().await;
    let catalog = TrackCatalog::new(test.store.clone());

    let track = catalog
        .create(
            bytes_source("song.mp3"),
            TrackMetadata::default(),
            TrackMetadata::default(),
        )
        .await;

    assert_eq!(track.source, TrackSource::Blob);
    assert_eq!(test.store.get(&track.id).await, Some(vec![1u8; 256]));
}

#[tokio::test]
async fn metadata_priority_overrides_beat_parsed_beat_filename() {
    let test = TestStore::new().await;
    let catalog = TrackCatalog::new(test.store.clone());

    let parsed = TrackMetadata {
        title: Some("Tag Title".to_string()),
        artist: Some("Tag Artist".to_string()),
        album: Some("Tag Album".to_string()),
        ..TrackMetadata::default()
    };
    let overrides = TrackMetadata {
        title: Some("Override Title".to_string()),
        ..TrackMetadata::default()
    };

    let track = catalog
        .create(bytes_source("File Artist - File Title.mp3"), parsed, overrides)
        .await;

    assert_eq!(track.title, "Override Title");
    assert_eq!(track.artist, "Tag Artist");
    assert_eq!(track.album, "Tag Album");
}

#[tokio::test]
async fn filename_heuristic_fills_gaps_then_defaults() {
    let test = TestStore::new().await;
    let catalog = TrackCatalog::new(test.store.clone());

    let track = catalog
        .create(
            bytes_source("Nina Simone - Feeling Good.flac"),
            TrackMetadata::default(),
            TrackMetadata::default(),
        )
        .await;
    assert_eq!(track.title, "Feeling Good");
    assert_eq!(track.artist, "Nina Simone");
    assert_eq!(track.album, "Unknown Album");

    let plain = catalog
        .create(
            bytes_source("voicemail.wav"),
            TrackMetadata::default(),
            TrackMetadata::default(),
        )
        .await;
    assert_eq!(plain.title, "voicemail");
    assert_eq!(plain.artist, "Unknown Artist");
}

#[tokio::test]
async fn remote_track_keeps_url_and_gets_own_id() {
    let test = TestStore::new().await;
    let catalog = TrackCatalog::new(test.store.clone());

    let track = catalog
        .create(
            NewTrackSource::Remote {
                url: "https://example.com/stream.mp3".to_string(),
                file_name: None,
            },
            TrackMetadata::default(),
            TrackMetadata::default(),
        )
        .await;

    assert_eq!(
        track.source,
        TrackSource::Remote {
            url: "https://example.com/stream.mp3".to_string()
        }
    );
    // No bytes were stored for it
    assert_eq!(test.store.get(&track.id).await, None);
}

#[tokio::test]
async fn duration_backfill_via_update() {
    let test = TestStore::new().await;
    let catalog = TrackCatalog::new(test.store.clone());

    let track = catalog
        .create(
            bytes_source("song.mp3"),
            TrackMetadata::default(),
            TrackMetadata::default(),
        )
        .await;
    assert_eq!(track.duration_seconds, 0.0);

    let updated = catalog
        .update(
            &track.id,
            TrackMetadata {
                duration_seconds: Some(184.5),
                ..TrackMetadata::default()
            },
        )
        .expect("track exists");
    assert_eq!(updated.duration_seconds, 184.5);
    assert_eq!(updated.title, track.title);
}

#[tokio::test]
async fn update_unknown_id_is_none() {
    let test = TestStore::new().await;
    let catalog = TrackCatalog::new(test.store.clone());
    assert!(catalog.update("missing", TrackMetadata::default()).is_none());
}

#[tokio::test]
async fn remove_releases_blob() {
    let test = TestStore::new().await;
    let catalog = TrackCatalog::new(test.store.clone());

    let track = catalog
        .create(
            bytes_source("song.mp3"),
            TrackMetadata::default(),
            TrackMetadata::default(),
        )
        .await;

    let removed = catalog.remove(&track.id).await.expect("track existed");
    assert_eq!(removed.id, track.id);
    assert!(!catalog.contains(&track.id));
    assert_eq!(test.store.get(&track.id).await, None);
}

#[tokio::test]
async fn all_lists_newest_first() {
    let test = TestStore::new().await;
    let catalog = TrackCatalog::new(test.store.clone());

    let first = catalog
        .create(
            bytes_source("a.mp3"),
            TrackMetadata::default(),
            TrackMetadata::default(),
        )
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = catalog
        .create(
            bytes_source("b.mp3"),
            TrackMetadata::default(),
            TrackMetadata::default(),
        )
        .await;

    let all = catalog.all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);
}
