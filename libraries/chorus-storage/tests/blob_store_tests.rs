//! Blob store integration tests: tier transparency, capacity fallback,
//! mirror survival, eviction accounting.

mod test_helpers;

use chorus_storage::{BlobStoreConfig, Tier};
use std::time::Duration;
use test_helpers::{open_store, TestStore};

fn tight_config(soft_limit: usize) -> BlobStoreConfig {
    BlobStoreConfig {
        primary_soft_limit: soft_limit,
        write_timeout: Duration::from_secs(10),
        mirror_max_bytes: 5 * 1024 * 1024,
    }
}

#[tokio::test]
async fn tier_transparency_primary() {
    let test = TestStore::new().await;
    let bytes = vec![7u8; 1024];

    let id = test.store.put(bytes.clone()).await;
    assert_eq!(test.store.tier_of(&id), Some(Tier::Primary));
    assert_eq!(test.store.get(&id).await, Some(bytes));
}

#[tokio::test]
async fn tier_transparency_fallback() {
    // Soft limit zero forces every write into the fallback tier
    let test = TestStore::with_config(tight_config(0)).await;
    let bytes = vec![9u8; 2048];

    let id = test.store.put(bytes.clone()).await;
    assert_eq!(test.store.tier_of(&id), Some(Tier::Fallback));
    assert_eq!(test.store.get(&id).await, Some(bytes));
}

#[tokio::test]
async fn capacity_fallback_after_soft_limit() {
    let test = TestStore::with_config(tight_config(2)).await;

    let a = test.store.put(vec![1u8; 64]).await;
    let b = test.store.put(vec![2u8; 64]).await;
    let c = test.store.put(vec![3u8; 64]).await;

    assert_eq!(test.store.tier_of(&a), Some(Tier::Primary));
    assert_eq!(test.store.tier_of(&b), Some(Tier::Primary));
    assert_eq!(test.store.tier_of(&c), Some(Tier::Fallback));

    let health = test.store.counts();
    assert_eq!(health.persistent, 2);
    assert_eq!(health.temporary, 1);

    // The diverted payload is still retrievable
    assert_eq!(test.store.get(&c).await, Some(vec![3u8; 64]));
}

#[tokio::test]
async fn id_format_does_not_leak_tier() {
    let test = TestStore::with_config(tight_config(1)).await;

    let primary = test.store.put(vec![1u8; 16]).await;
    let fallback = test.store.put(vec![2u8; 16]).await;

    // Same shape: <millis>-<12 hex chars>
    for id in [&primary, &fallback] {
        let (millis, suffix) = id.split_once('-').expect("id has a dash");
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 12);
    }
}

#[tokio::test]
async fn small_fallback_payload_survives_primary_loss() {
    let dir = {
        let test = TestStore::with_config(tight_config(0)).await;
        let id = test.store.put(vec![5u8; 512]).await;
        (test.temp_dir, id)
    };
    let (dir, id) = dir;

    // Fresh primary database file, same vault: only the mirror survives
    let (store, _pool, _vault) = open_store(&dir, "blobs-after-loss.db", tight_config(0)).await;
    assert_eq!(store.get(&id).await, Some(vec![5u8; 512]));
    assert_eq!(store.tier_of(&id), Some(Tier::Fallback));
}

#[tokio::test]
async fn oversized_fallback_payload_is_not_mirrored() {
    let config = BlobStoreConfig {
        primary_soft_limit: 0,
        write_timeout: Duration::from_secs(10),
        mirror_max_bytes: 100,
    };
    let dir = {
        let test = TestStore::with_config(config.clone()).await;
        let id = test.store.put(vec![5u8; 512]).await;
        // Still retrievable from memory while the process lives
        assert_eq!(test.store.get(&id).await, Some(vec![5u8; 512]));
        (test.temp_dir, id)
    };
    let (dir, id) = dir;

    let (store, _pool, _vault) = open_store(&dir, "blobs-after-loss.db", config).await;
    assert_eq!(store.get(&id).await, None);
}

#[tokio::test]
async fn get_missing_id_is_none_not_error() {
    let test = TestStore::new().await;
    assert_eq!(test.store.get("no-such-id").await, None);
    assert_eq!(test.store.tier_of("no-such-id"), None);
}

#[tokio::test]
async fn delete_removes_from_either_tier() {
    let test = TestStore::with_config(tight_config(1)).await;

    let primary = test.store.put(vec![1u8; 32]).await;
    let fallback = test.store.put(vec![2u8; 32]).await;

    test.store.delete(&primary).await;
    test.store.delete(&fallback).await;

    assert_eq!(test.store.get(&primary).await, None);
    assert_eq!(test.store.get(&fallback).await, None);
    let health = test.store.counts();
    assert_eq!(health.persistent, 0);
    assert_eq!(health.temporary, 0);
}

#[tokio::test]
async fn playback_url_round_trip_and_revoke() {
    let test = TestStore::new().await;
    let id = test.store.put(vec![42u8; 128]).await;

    let url = test
        .store
        .playback_url(&id)
        .await
        .expect("playable payload has a URL");
    assert_eq!(url.scheme(), "file");

    let path = url.to_file_path().expect("file URL resolves to a path");
    assert_eq!(std::fs::read(&path).expect("media file exists"), vec![42u8; 128]);

    // Repeated requests reuse the handle
    assert_eq!(test.store.playback_url(&id).await, Some(url));

    test.store.revoke_url(&id);
    assert!(!path.exists());
}

#[tokio::test]
async fn playback_url_for_missing_bytes_is_none() {
    let test = TestStore::new().await;
    assert_eq!(test.store.playback_url("no-such-id").await, None);
}

#[tokio::test]
async fn promote_moves_payload_to_primary() {
    let (dir, id) = {
        let test = TestStore::with_config(tight_config(0)).await;
        let id = test.store.put(vec![8u8; 64]).await;
        assert_eq!(test.store.tier_of(&id), Some(Tier::Fallback));

        // Promotion fails while the primary tier has no room
        assert!(!test.store.promote(&id).await);
        (test.temp_dir, id)
    };

    // Reopen with room: the mirrored payload can now be promoted
    let (store, _pool, _vault) = open_store(&dir, "blobs.db", tight_config(10)).await;
    assert!(store.promote(&id).await);
    assert_eq!(store.tier_of(&id), Some(Tier::Primary));
    assert_eq!(store.get(&id).await, Some(vec![8u8; 64]));
}

#[tokio::test]
async fn verification_demotes_silently_dropped_rows() {
    let test = TestStore::new().await;
    let id = test.store.put(vec![3u8; 32]).await;
    assert_eq!(test.store.counts().persistent, 1);

    // Simulate an engine that lost the row after reporting success
    sqlx::query("DELETE FROM blobs WHERE id = ?")
        .bind(&id)
        .execute(&test.pool)
        .await
        .expect("row delete");

    // Background verification runs shortly after the commit
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(test.store.counts().persistent, 0);
}

#[tokio::test]
async fn clear_all_wipes_every_tier() {
    let test = TestStore::with_config(tight_config(1)).await;
    let primary = test.store.put(vec![1u8; 16]).await;
    let fallback = test.store.put(vec![2u8; 16]).await;
    test.store.playback_url(&primary).await;

    test.store.clear_all().await.expect("clear_all");

    assert_eq!(test.store.get(&primary).await, None);
    assert_eq!(test.store.get(&fallback).await, None);
    assert_eq!(test.store.counts().persistent, 0);
    assert_eq!(test.store.counts().temporary, 0);
    assert!(test.vault.mirror_keys().expect("mirror keys").is_empty());
}

#[tokio::test]
async fn hydrate_restores_accounting() {
    let config = tight_config(5);
    let dir = {
        let test = TestStore::with_config(config.clone()).await;
        test.store.put(vec![1u8; 16]).await;
        test.store.put(vec![2u8; 16]).await;
        // Let post-commit verification finish so the vault handle is
        // released before the reopen below
        tokio::time::sleep(Duration::from_millis(400)).await;
        test.temp_dir
    };

    let (store, _pool, _vault) = open_store(&dir, "blobs.db", config).await;
    assert_eq!(store.counts().persistent, 2);
}
