//! End-to-end engine tests over real on-disk storage

use chorus_core::types::{
    InsertPosition, TrackMetadata, TransportStatus, CURRENT_COLLECTION,
};
use chorus_engine::{Engine, EngineConfig};
use chorus_storage::NewTrackSource;
use tempfile::TempDir;

async fn open_engine() -> anyhow::Result<(Engine, TempDir)> {
    let dir = tempfile::tempdir()?;
    let engine = Engine::open(EngineConfig::new(dir.path())).await?;
    Ok((engine, dir))
}

async fn add_file_track(engine: &mut Engine, name: &str) -> String {
    let track = engine
        .add_track(
            NewTrackSource::Bytes {
                bytes: format!("audio for {name}").into_bytes(),
                file_name: format!("Artist - {name}.mp3"),
            },
            TrackMetadata::default(),
        )
        .await;
    track.id
}

#[tokio::test]
async fn add_track_resolves_to_playable_url() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let id = add_file_track(&mut engine, "Song").await;

    let track = engine.track(&id).expect("catalog record");
    assert_eq!(track.title, "Song");
    assert_eq!(track.artist, "Artist");

    let url = engine.playback_url(&id).await.expect("playback url");
    let path = url.to_file_path().expect("file-backed url");
    assert_eq!(std::fs::read(path)?, b"audio for Song");
    Ok(())
}

#[tokio::test]
async fn queue_playback_scenario() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let mut ids = Vec::new();
    for name in ["One", "Two", "Three"] {
        ids.push(add_file_track(&mut engine, name).await);
    }
    engine.insert_tracks(CURRENT_COLLECTION, &ids, InsertPosition::Back)?;

    engine.play(CURRENT_COLLECTION, 0).await?;
    assert_eq!(engine.transport().status(), TransportStatus::Playing);
    assert_eq!(engine.transport().index(), 0);

    engine.next().await?;
    assert_eq!(engine.transport().index(), 1);
    assert_eq!(engine.transport().status(), TransportStatus::Playing);

    // Move the currently playing index into a playlist: the queue
    // shrinks to 2 and playback reloads at the clamped index 1
    let playlist = engine.create_collection("Playlist X", None)?;
    engine
        .move_tracks(CURRENT_COLLECTION, &[1], &playlist.id, InsertPosition::Back)
        .await?;

    assert_eq!(engine.queue().len(), 2);
    assert_eq!(engine.collection_tracks(&playlist.id).unwrap().len(), 1);
    assert_eq!(engine.transport().index(), 1);
    assert_eq!(engine.transport().status(), TransportStatus::Playing);
    Ok(())
}

#[tokio::test]
async fn manual_next_wraps_at_end() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let first = add_file_track(&mut engine, "A").await;
    let second = add_file_track(&mut engine, "B").await;
    engine.insert_tracks(
        CURRENT_COLLECTION,
        &[first, second],
        InsertPosition::Back,
    )?;

    engine.play(CURRENT_COLLECTION, 1).await?;
    engine.next().await?;
    assert_eq!(engine.transport().index(), 0);

    engine.previous().await?;
    assert_eq!(engine.transport().index(), 1);
    Ok(())
}

#[tokio::test]
async fn removing_last_playing_track_stops() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let id = add_file_track(&mut engine, "Only").await;
    engine.insert_tracks(CURRENT_COLLECTION, &[id], InsertPosition::Back)?;

    engine.play(CURRENT_COLLECTION, 0).await?;
    engine.remove_tracks(CURRENT_COLLECTION, &[0]).await?;

    assert_eq!(engine.transport().status(), TransportStatus::Stopped);
    assert!(engine.queue().is_empty());
    Ok(())
}

#[tokio::test]
async fn undo_restores_removed_tracks() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let id = add_file_track(&mut engine, "Keeper").await;
    engine.insert_tracks(CURRENT_COLLECTION, &[id.clone()], InsertPosition::Back)?;

    let entry_id = engine
        .remove_tracks(CURRENT_COLLECTION, &[0])
        .await?
        .expect("recorded removal");
    assert!(engine.queue().is_empty());

    assert!(engine.undo(&entry_id));
    assert_eq!(engine.queue(), &[id]);

    // One-shot: a second undo is a silent no-op
    assert!(!engine.undo(&entry_id));
    assert_eq!(engine.queue().len(), 1);
    Ok(())
}

#[tokio::test]
async fn undo_recreates_missing_catalog_record() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let id = add_file_track(&mut engine, "Ghost").await;
    engine.insert_tracks(CURRENT_COLLECTION, &[id.clone()], InsertPosition::Back)?;

    let entry_id = engine
        .remove_tracks(CURRENT_COLLECTION, &[0])
        .await?
        .expect("recorded removal");
    engine.remove_track(&id).await?;
    assert!(engine.track(&id).is_none());

    assert!(engine.undo(&entry_id));
    let restored = engine.track(&id).expect("restored record");
    assert_eq!(restored.title, "Ghost");
    assert_eq!(engine.queue(), &[id]);
    Ok(())
}

#[tokio::test]
async fn deleting_active_collection_falls_back_to_queue() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let id = add_file_track(&mut engine, "Listed").await;
    let playlist = engine.create_collection("Jazz", None)?;
    engine.insert_tracks(&playlist.id, &[id], InsertPosition::Back)?;

    engine.play(&playlist.id, 0).await?;
    engine.delete_collection(&playlist.id)?;

    assert_eq!(engine.transport().status(), TransportStatus::Stopped);
    assert_eq!(engine.transport().collection_id(), CURRENT_COLLECTION);
    assert!(engine.custom_collections().is_empty());
    Ok(())
}

#[tokio::test]
async fn same_collection_move_records_nothing() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let id = add_file_track(&mut engine, "Stay").await;
    engine.insert_tracks(CURRENT_COLLECTION, &[id], InsertPosition::Back)?;
    let before = engine.list_actions().len();

    let outcome = engine
        .move_tracks(
            CURRENT_COLLECTION,
            &[0],
            CURRENT_COLLECTION,
            InsertPosition::Front,
        )
        .await?;

    assert!(outcome.is_none());
    assert_eq!(engine.list_actions().len(), before);
    Ok(())
}

#[tokio::test]
async fn library_survives_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (track_id, playlist_id) = {
        let mut engine = Engine::open(EngineConfig::new(dir.path())).await?;
        let id = add_file_track(&mut engine, "Persistent").await;
        engine.insert_tracks(CURRENT_COLLECTION, &[id.clone()], InsertPosition::Back)?;
        let playlist = engine.create_collection("Saved", None)?;
        engine.set_volume(0.5);
        // Let the blob store's post-commit verification finish so the
        // vault handle is released before the reopen below
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
        (id, playlist.id)
    };

    let engine = Engine::open(EngineConfig::new(dir.path())).await?;
    assert_eq!(engine.queue(), &[track_id.clone()]);
    assert_eq!(engine.custom_collections()[0].id, playlist_id);
    assert_eq!(engine.transport().settings().volume, 0.5);
    assert_eq!(
        engine.track(&track_id).map(|t| t.title),
        Some("Persistent".to_string())
    );

    // Bytes come back through the blob store as well
    assert!(engine.playback_url(&track_id).await.is_some());
    Ok(())
}

#[tokio::test]
async fn track_end_records_listen_and_advances() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let first = add_file_track(&mut engine, "First").await;
    let second = add_file_track(&mut engine, "Second").await;
    engine.insert_tracks(
        CURRENT_COLLECTION,
        &[first.clone(), second],
        InsertPosition::Back,
    )?;

    engine.play(CURRENT_COLLECTION, 0).await?;
    engine.track_ended(42.0).await?;

    assert_eq!(engine.transport().index(), 1);
    let stats = engine.listening_stats(None);
    assert_eq!(stats.total_seconds, 42);
    assert_eq!(stats.top_tracks[0].track_id, first);
    Ok(())
}

#[tokio::test]
async fn storage_health_reports_persistent_payloads() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    add_file_track(&mut engine, "Counted").await;

    let health = engine.storage_health();
    assert_eq!(health.persistent, 1);
    assert_eq!(health.temporary, 0);
    Ok(())
}

#[tokio::test]
async fn full_reset_wipes_everything() -> anyhow::Result<()> {
    let (mut engine, _dir) = open_engine().await?;
    let id = add_file_track(&mut engine, "Doomed").await;
    engine.insert_tracks(CURRENT_COLLECTION, &[id.clone()], InsertPosition::Back)?;
    engine.create_collection("Doomed List", None)?;

    engine.full_reset().await?;

    assert!(engine.tracks().is_empty());
    assert!(engine.queue().is_empty());
    assert!(engine.custom_collections().is_empty());
    assert!(engine.list_actions().is_empty());
    assert_eq!(engine.storage_health().persistent, 0);
    assert!(engine.playback_url(&id).await.is_none());
    Ok(())
}
