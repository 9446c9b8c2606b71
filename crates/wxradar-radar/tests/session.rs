mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use wxradar_radar::{spawn_session, CommandError, DisplayState, HELP_TEXT};
use wxradar_weather::Location;

fn resolver() -> Arc<StubResolver> {
    Arc::new(StubResolver::new(
        vec![
            Location::new("Miami, United States", 25.7617, -80.1918),
            Location::new("London, United Kingdom", 51.5074, -0.1278),
        ],
        Location::new("Manila, Philippines", 14.5995, 120.9842),
    ))
}

#[tokio::test(start_paused = true)]
async fn test_start_display_animates() {
    let sink = MockSink::new();
    let (radar, task) = spawn_session(controller(sink.clone(), StubSource::new(rainy())), resolver());

    assert_eq!(radar.start_display().await.unwrap(), 3);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let status = radar.status().await.unwrap();
    assert_eq!(status.state, DisplayState::Animating);
    assert!(status.cycles >= 3, "cycles {}", status.cycles);
    assert!(status.phase > 0.0);
    assert!(!sink.updates().is_empty());

    drop(radar);
    let ctl = task.await.unwrap();
    assert_eq!(ctl.state(), DisplayState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_animation_and_cleans_up() {
    let sink = MockSink::new();
    let (radar, _task) = spawn_session(controller(sink.clone(), StubSource::new(rainy())), resolver());
    radar.start_display().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(radar.stop().await.unwrap(), 3);
    let after_stop = sink.updates().len();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(sink.updates().len(), after_stop);
    assert_eq!(sink.deletes(), vec![1, 2, 3]);
    assert_eq!(radar.status().await.unwrap().state, DisplayState::Idle);
    // Nothing left to stop
    assert_eq!(radar.stop().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_previous_display() {
    let sink = MockSink::new();
    let (radar, _task) = spawn_session(controller(sink.clone(), StubSource::new(rainy())), resolver());
    radar.start_display().await.unwrap();
    radar.start_display().await.unwrap();

    assert_eq!(sink.deletes(), vec![1, 2, 3]);
    let status = radar.status().await.unwrap();
    assert_eq!(status.state, DisplayState::Animating);
    assert_eq!(status.segment_rows, vec![0..7, 7..14, 14..21]);
}

#[tokio::test(start_paused = true)]
async fn test_start_display_with_no_segments_fails() {
    let sink = MockSink::new();
    for n in 0..3 {
        sink.fail_create(n);
    }
    let (radar, _task) = spawn_session(controller(sink, StubSource::new(rainy())), resolver());

    assert!(matches!(
        radar.start_display().await,
        Err(CommandError::NothingDisplayed)
    ));
    assert_eq!(radar.status().await.unwrap().state, DisplayState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_set_location_by_name_resets_phase() {
    let sink = MockSink::new();
    let (radar, _task) = spawn_session(controller(sink.clone(), StubSource::new(rainy())), resolver());
    radar.start_display().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let location = radar.set_location_by_name("  miami ").await.unwrap();
    assert_eq!(location.name, "Miami, United States");

    let status = radar.status().await.unwrap();
    assert_eq!(status.location, location);
    assert_eq!(status.phase, 0.0);
    assert_eq!(status.state, DisplayState::Animating);

    let (_, latest_header) = sink
        .updates()
        .into_iter()
        .filter(|(h, _)| *h == 1)
        .last()
        .unwrap();
    assert!(latest_header.contains("WEATHER RADAR - Miami, United States"));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_location_leaves_state_unchanged() {
    let (radar, _task) = spawn_session(controller(MockSink::new(), StubSource::new(rainy())), resolver());
    radar.start_display().await.unwrap();
    tokio::time::sleep(Duration::from_millis(950)).await;
    let before = radar.status().await.unwrap();

    let result = radar.set_location_by_name("Atlantis").await;
    assert!(matches!(result, Err(CommandError::LocationNotFound(q)) if q == "Atlantis"));

    let after = radar.status().await.unwrap();
    assert_eq!(after.location, katy());
    assert_eq!(after.state, DisplayState::Animating);
    assert!(after.phase >= before.phase);
}

#[tokio::test(start_paused = true)]
async fn test_upstream_geocode_failure_reads_as_not_found() {
    let resolver = Arc::new(StubResolver::new(vec![], katy()).down());
    let (radar, _task) = spawn_session(controller(MockSink::new(), StubSource::new(rainy())), resolver);

    assert!(matches!(
        radar.set_location_by_name("Paris").await,
        Err(CommandError::LocationNotFound(_))
    ));
    assert_eq!(radar.status().await.unwrap().location, katy());
}

#[tokio::test(start_paused = true)]
async fn test_empty_query_is_rejected() {
    let (radar, _task) = spawn_session(controller(MockSink::new(), StubSource::new(rainy())), resolver());
    assert!(matches!(
        radar.set_location_by_name("   ").await,
        Err(CommandError::EmptyQuery)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_random_active_location() {
    let (radar, _task) = spawn_session(controller(MockSink::new(), StubSource::new(rainy())), resolver());

    let location = radar.set_location_random_active().await.unwrap();

    assert_eq!(location.name, "Manila, Philippines");
    assert_eq!(radar.status().await.unwrap().location, location);
}

#[tokio::test(start_paused = true)]
async fn test_help_lists_commands() {
    let (radar, _task) = spawn_session(controller(MockSink::new(), StubSource::new(rainy())), resolver());
    assert_eq!(radar.help(), HELP_TEXT);
    for command in [".radar", ".weather", ".stop", ".location", ".random", ".help"] {
        assert!(HELP_TEXT.contains(command), "{command}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handles_tears_down_display() {
    let sink = MockSink::new();
    let (radar, task) = spawn_session(controller(sink.clone(), StubSource::new(rainy())), resolver());
    let other = radar.clone();
    radar.start_display().await.unwrap();

    drop(radar);
    assert_eq!(other.status().await.unwrap().state, DisplayState::Animating);
    drop(other);

    let ctl = task.await.unwrap();
    assert_eq!(ctl.state(), DisplayState::Idle);
    assert_eq!(sink.deletes(), vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_closed_session_reports_error() {
    let (radar, task) = spawn_session(controller(MockSink::new(), StubSource::new(rainy())), resolver());
    task.abort();
    let _ = task.await;

    assert!(matches!(radar.stop().await, Err(CommandError::SessionClosed)));
}
