//! Control loop behaviour under a paused tokio clock

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tokio::time;

use thinkcontrol_bci_core::{Channel, DecoderConfig, Label, ManualClock, RunState};
use thinkcontrol_bci_native::{ControlLoop, TickUpdate};

fn session(seed: u64) -> ControlLoop<StdRng, ManualClock> {
    session_with(DecoderConfig::default(), seed)
}

fn session_with(config: DecoderConfig, seed: u64) -> ControlLoop<StdRng, ManualClock> {
    ControlLoop::new(config, StdRng::seed_from_u64(seed), ManualClock::default())
        .expect("valid config")
}

fn drain(rx: &mut Receiver<TickUpdate>) -> Vec<TickUpdate> {
    let mut updates = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(update) => updates.push(update),
            Err(TryRecvError::Empty) => return updates,
            Err(err) => panic!("unexpected receive error: {err}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_ticks_at_configured_cadence() {
    let session = session(1);
    let mut rx = session.subscribe();
    session.start().expect("inside runtime");
    assert_eq!(session.run_state(), RunState::Running);

    time::sleep(Duration::from_millis(1_050)).await;
    let updates = drain(&mut rx);

    assert_eq!(updates.len(), 10);
    let sequences: Vec<u64> = updates.iter().map(|u| u.sequence).collect();
    assert_eq!(sequences, (1..=10).collect::<Vec<_>>());
    assert!(updates.iter().all(|u| !u.forced));
    assert_eq!(session.window(Channel::C3).len(), 10);
    assert_eq!(session.snapshot(), updates[9].snapshot);
}

#[tokio::test(start_paused = true)]
async fn test_custom_cadence() {
    let session = session_with(DecoderConfig::default().tick_interval_ms(250), 2);
    let mut rx = session.subscribe();
    session.start().expect("inside runtime");

    time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(drain(&mut rx).len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_does_not_double_cadence() {
    let session = session(3);
    let mut rx = session.subscribe();
    session.start().expect("inside runtime");
    time::sleep(Duration::from_millis(50)).await;
    session.start().expect("inside runtime");

    time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(drain(&mut rx).len(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_ticks_and_start_resumes() {
    let session = session(4);
    let mut rx = session.subscribe();
    session.start().expect("inside runtime");

    time::sleep(Duration::from_millis(350)).await;
    session.stop();
    assert_eq!(session.run_state(), RunState::Idle);
    let before = drain(&mut rx);
    assert_eq!(before.len(), 3);
    let frozen = session.snapshot();

    time::sleep(Duration::from_secs(5)).await;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(session.snapshot(), frozen);
    assert_eq!(session.window(Channel::Cz).len(), 3);

    session.start().expect("inside runtime");
    time::sleep(Duration::from_millis(250)).await;
    let after: Vec<u64> = drain(&mut rx).iter().map(|u| u.sequence).collect();
    assert_eq!(after, vec![4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_reset_while_running_keeps_running() {
    let session = session_with(DecoderConfig::default().record_probability(1.0), 5);
    let mut rx = session.subscribe();
    session.start().expect("inside runtime");

    time::sleep(Duration::from_millis(550)).await;
    assert!(!session.snapshot().history.is_empty());

    let snapshot = session.reset();
    assert_eq!(snapshot.cursor_position, 50.0);
    assert_eq!(snapshot.hits_left, 0);
    assert_eq!(snapshot.hits_right, 0);
    assert!(snapshot.history.is_empty());
    assert_eq!(session.run_state(), RunState::Running);
    assert_eq!(session.window(Channel::C4).len(), 5);
    drain(&mut rx);

    time::sleep(Duration::from_millis(100)).await;
    let updates = drain(&mut rx);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].snapshot.history.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_force_classify_while_running() {
    let session = session(6);
    let mut rx = session.subscribe();
    session.start().expect("inside runtime");

    time::sleep(Duration::from_millis(150)).await;
    let forced = session.force_classify();
    assert!(forced.forced);
    assert_eq!(forced.sequence, 2);
    assert_eq!(forced.snapshot.history.first(), forced.recorded.as_ref());

    time::sleep(Duration::from_millis(100)).await;
    let updates = drain(&mut rx);
    let flags: Vec<(u64, bool)> = updates.iter().map(|u| (u.sequence, u.forced)).collect();
    assert_eq!(flags, vec![(1, false), (2, true), (3, false)]);
}

#[tokio::test(start_paused = true)]
async fn test_force_classify_while_idle_does_not_start_timer() {
    let session = session(7);
    let mut rx = session.subscribe();

    let update = session.force_classify();
    assert_eq!(update.snapshot.history.len(), 1);
    assert!(session.window(Channel::C3).is_empty());

    time::sleep(Duration::from_secs(2)).await;
    assert_eq!(drain(&mut rx).len(), 1);
    assert_eq!(session.run_state(), RunState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_hit_events_match_counters() {
    let config = DecoderConfig::default()
        .persistence(1.0)
        .initial_label(Label::Right);
    let session = session_with(config, 8);
    let mut rx = session.subscribe();
    session.start().expect("inside runtime");

    let mut right_events = 0u32;
    let mut last = None;
    for _ in 0..300 {
        let update = rx.recv().await.expect("timer running");
        for hit in &update.events {
            assert_eq!(hit.side(), Label::Right);
            assert_eq!(hit.highlight_ms(), 500);
            assert!(update.snapshot.cursor_position > 85.0);
            right_events += 1;
        }
        last = Some(update);
    }
    session.stop();

    let last = last.expect("received updates");
    assert!(right_events > 0);
    assert_eq!(last.snapshot.hits_right, right_events);
    assert_eq!(last.snapshot.hits_left, 0);
    assert_eq!(last.snapshot.cursor_position, 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_session_closes_updates() {
    let session = session(9);
    let mut rx = session.subscribe();
    session.start().expect("inside runtime");
    time::sleep(Duration::from_millis(250)).await;
    drop(session);

    let mut received = 0;
    loop {
        match time::timeout(Duration::from_secs(1), rx.recv()).await {
            Ok(Ok(_)) => received += 1,
            Ok(Err(RecvError::Closed)) => break,
            Ok(Err(err)) => panic!("unexpected receive error: {err}"),
            Err(_) => panic!("updates channel stayed open after drop"),
        }
    }
    assert_eq!(received, 2);
}
