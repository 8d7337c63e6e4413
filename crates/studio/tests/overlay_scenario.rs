use std::sync::Arc;

use streamlay_overlay_model::{OverlayId, OverlayKind, Position, Size};
use streamlay_stream_session::{HeadlessSurface, PlaybackState};
use streamlay_store_client::{MemoryStore, OverlayStore, StoreCall};
use streamlay_studio::{Studio, StudioEvent};

fn new_studio() -> (Arc<MemoryStore>, Studio) {
    let store = Arc::new(MemoryStore::new());
    let studio = Studio::new(store.clone(), Box::new(HeadlessSurface::new(800, 400)));
    (store, studio)
}

#[tokio::test]
async fn create_edit_and_reload_logo_overlay() {
    let (store, mut studio) = new_studio();
    studio.load().await.unwrap();

    for (field, value) in [
        ("name", "Logo"),
        ("type", "image"),
        ("content", "https://x/y.png"),
        ("position.x", "10"),
        ("position.y", "10"),
        ("size.width", "100"),
        ("size.height", "40"),
    ] {
        studio.form_input(field, value).unwrap();
    }
    let created = studio.submit_form().await.unwrap();
    assert_eq!(created.id.as_str(), "1");

    let overlays = studio.overlays();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].name, "Logo");
    assert_eq!(overlays[0].kind, OverlayKind::Image);
    assert_eq!(overlays[0].content, "https://x/y.png");
    assert_eq!(overlays[0].position, Position::new(10, 10));
    assert_eq!(overlays[0].size, Size::new(100, 40));

    store.clear_calls();
    studio.edit_overlay(&OverlayId::from("1")).unwrap();
    studio.form_input("position.x", "99").unwrap();
    studio.submit_form().await.unwrap();

    match &store.calls()[0] {
        StoreCall::Update(id, draft) => {
            assert_eq!(id.as_str(), "1");
            assert_eq!(draft.position.x, 99);
        }
        other => panic!("expected an update call, got {other:?}"),
    }
    assert_eq!(studio.overlays()[0].position.x, 99);
    assert_eq!(
        studio.render().summaries,
        ["Logo - image at (99%, 10%) - Size: 100x40"]
    );
}

#[tokio::test]
async fn deleting_a_missing_overlay_shows_server_state() {
    let (store, mut studio) = new_studio();
    studio.form_input("name", "Clock").unwrap();
    studio.form_input("content", "12:00").unwrap();
    let clock = studio.submit_form().await.unwrap();

    store.delete_overlay(&clock.id).await.unwrap();

    let deleted = studio
        .delete_overlay(&clock.id, &|_: &str| true)
        .await
        .unwrap();
    assert!(deleted);
    assert!(studio.overlays().is_empty());
    assert_eq!(studio.overlays(), store.snapshot().as_slice());
}

#[tokio::test]
async fn playback_cycle_publishes_each_transition() {
    let (_store, mut studio) = new_studio();
    let mut rx = studio.subscribe();

    studio.set_rtsp_url("rtsp://example.com/s");
    assert_eq!(studio.start_stream().unwrap(), PlaybackState::Ready);
    assert_eq!(studio.toggle_playback().unwrap(), PlaybackState::Playing);
    assert_eq!(studio.toggle_playback().unwrap(), PlaybackState::Paused);
    assert_eq!(studio.stop_stream(), PlaybackState::NoStream);

    let mut states = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let StudioEvent::PlaybackChanged { state, .. } = event {
            states.push(state);
        }
    }
    assert_eq!(
        states,
        [
            PlaybackState::Ready,
            PlaybackState::Playing,
            PlaybackState::Paused,
            PlaybackState::NoStream,
        ]
    );
}
