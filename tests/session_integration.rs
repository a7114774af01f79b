//! End-to-end mode loop tests over recorded key traces.
//!
//! Every test runs on a paused tokio clock, so event and tick times are exact.

use keymouse::config::Config;
use keymouse::input::{ClickButton, InputError, KeyEventKind, StaticKeyResolver};
use keymouse::session::{
    run_replay, run_replay_with_grab, ExitReason, GrabEvent, PointerAction, PointerActionKind,
    RecordingGrab, ReplayReport, Trace, TraceEvent,
};
use std::io::Write;
use tempfile::NamedTempFile;

use KeyEventKind::{Press, Release};

fn trace(events: &[(u64, &str, KeyEventKind)]) -> Trace {
    Trace {
        events: events
            .iter()
            .map(|&(at_ms, key, kind)| TraceEvent {
                at_ms,
                key: key.to_string(),
                kind,
            })
            .collect(),
    }
}

async fn replay(config: &Config, events: &[(u64, &str, KeyEventKind)]) -> ReplayReport {
    run_replay(config, &StaticKeyResolver::new(), &trace(events))
        .await
        .unwrap()
}

fn moves(report: &ReplayReport) -> Vec<(u64, i32, i32)> {
    report
        .actions
        .iter()
        .filter_map(|action| match action.kind {
            PointerActionKind::Move { dx, dy } => Some((action.at_ms, dx, dy)),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_held_key_starts_moving_after_initial_delay() {
    let report = replay(
        &Config::default(),
        &[
            (0, "Alt_L", Release),
            (1000, "k", Press),
            (1310, "k", Release),
            (1500, "Escape", Release),
        ],
    )
    .await;

    let expected: Vec<_> = (1200..=1300).step_by(20).map(|t| (t, 0, -1)).collect();
    assert_eq!(moves(&report), expected);
    assert_eq!(report.total_motion(), (0, -6));

    assert_eq!(report.sessions.len(), 1);
    assert_eq!(report.sessions[0].exit, ExitReason::LeaveKey);
    assert_eq!(report.sessions[0].pointer_moves, 6);
    assert_eq!(report.sessions[0].duration_ms, 1500);
}

#[tokio::test(start_paused = true)]
async fn test_speed_accelerates_and_caps() {
    let report = replay(
        &Config::default(),
        &[
            (0, "Alt_L", Release),
            (100, "l", Press),
            (2010, "l", Release),
            (2100, "Escape", Release),
        ],
    )
    .await;

    let moves = moves(&report);
    let at = |t: u64| moves.iter().find(|m| m.0 == t).map(|m| m.1);

    assert_eq!(at(300), Some(1));
    assert_eq!(at(1100), Some(11));
    assert_eq!(at(1500), Some(32));
    assert_eq!(at(2000), Some(32));
    assert!(moves.iter().all(|&(_, dx, dy)| dy == 0 && (1..=32).contains(&dx)));

    let speeds: Vec<i32> = moves.iter().map(|m| m.1).collect();
    assert!(speeds.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn test_autorepeat_pair_keeps_hold() {
    let report = replay(
        &Config::default(),
        &[
            (0, "Alt_L", Release),
            (100, "k", Press),
            (410, "k", Release),
            (415, "k", Press),
            (710, "k", Release),
            (800, "Escape", Release),
        ],
    )
    .await;

    let times: Vec<u64> = moves(&report).iter().map(|m| m.0).collect();
    let expected: Vec<u64> = (300..=700).step_by(20).collect();
    assert_eq!(times, expected);
}

#[tokio::test(start_paused = true)]
async fn test_slow_repress_in_one_batch_restarts_hold() {
    // Both events land between the ticks at 400 and 420, but they are 13 ms
    // apart, so the press starts a new hold.
    let report = replay(
        &Config::default(),
        &[
            (0, "Alt_L", Release),
            (100, "k", Press),
            (402, "k", Release),
            (415, "k", Press),
            (710, "k", Release),
            (800, "Escape", Release),
        ],
    )
    .await;

    let times: Vec<u64> = moves(&report).iter().map(|m| m.0).collect();
    assert!(times.contains(&400));
    assert!(!times.iter().any(|&t| t > 400 && t < 600));
    assert!(times.contains(&600));
}

#[tokio::test(start_paused = true)]
async fn test_real_release_restarts_dead_zone() {
    let report = replay(
        &Config::default(),
        &[
            (0, "Alt_L", Release),
            (100, "k", Press),
            (310, "k", Release),
            (350, "k", Press),
            (700, "k", Release),
            (800, "Escape", Release),
        ],
    )
    .await;

    let times: Vec<u64> = moves(&report).iter().map(|m| m.0).collect();

    // First hold moves at 300; the new press at 350 waits out the dead zone
    // measured from that last move.
    assert_eq!(times.first(), Some(&300));
    assert!(!times.iter().any(|&t| t > 300 && t < 500));
    assert_eq!(times[1], 510);
}

#[tokio::test(start_paused = true)]
async fn test_click_key_holds_button() {
    let report = replay(
        &Config::default(),
        &[
            (0, "Alt_L", Release),
            (100, "f", Press),
            (500, "f", Release),
            (600, "Escape", Release),
        ],
    )
    .await;

    assert_eq!(
        report.actions,
        vec![
            PointerAction {
                at_ms: 100,
                kind: PointerActionKind::Press {
                    button: ClickButton::Left
                },
            },
            PointerAction {
                at_ms: 500,
                kind: PointerActionKind::Release {
                    button: ClickButton::Left
                },
            },
        ]
    );
    assert_eq!(report.sessions[0].button_events, 2);
}

#[tokio::test(start_paused = true)]
async fn test_click_press_release_in_one_batch_is_swallowed() {
    let report = replay(
        &Config::default(),
        &[
            (0, "Alt_L", Release),
            (100, "s", Press),
            (100, "s", Release),
            (200, "Escape", Release),
        ],
    )
    .await;

    assert!(report.actions.is_empty());
    assert_eq!(report.sessions[0].events_processed, 2);
}

#[tokio::test(start_paused = true)]
async fn test_leave_key_restores_grabs() {
    let report = replay(
        &Config::default(),
        &[
            (0, "Alt_L", Release),
            (50, "Escape", Press),
            (60, "Escape", Release),
        ],
    )
    .await;

    assert_eq!(
        report.grabs,
        vec![
            GrabEvent::TriggerEnabled,
            GrabEvent::TriggerDisabled,
            GrabEvent::KeyboardGrabbed,
            GrabEvent::KeyboardUngrabbed,
            GrabEvent::TriggerEnabled,
            GrabEvent::TriggerDisabled,
        ]
    );
    assert_eq!(report.sessions[0].exit, ExitReason::LeaveKey);
    assert_eq!(report.sessions[0].events_ignored, 2);
}

#[tokio::test(start_paused = true)]
async fn test_keys_before_trigger_are_ignored() {
    let report = replay(
        &Config::default(),
        &[
            (0, "k", Press),
            (500, "k", Release),
            (600, "Alt_L", Release),
            (700, "Escape", Release),
        ],
    )
    .await;

    assert!(report.actions.is_empty());
    assert_eq!(report.sessions.len(), 1);
    assert_eq!(report.sessions[0].events_processed, 0);
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_then_reenter() {
    let mut config = Config::default();
    config.session.idle_timeout_secs = 60;

    let report = replay(
        &config,
        &[
            (0, "Alt_L", Release),
            (120_000, "Alt_L", Release),
            (120_100, "Escape", Release),
        ],
    )
    .await;

    let exits: Vec<_> = report.sessions.iter().map(|s| s.exit).collect();
    assert_eq!(exits, vec![ExitReason::IdleTimeout, ExitReason::LeaveKey]);
    assert_eq!(report.sessions[0].duration_ms, 60_000);
}

#[tokio::test(start_paused = true)]
async fn test_trace_ending_in_mouse_mode_ungrabs() {
    let report = replay(
        &Config::default(),
        &[(0, "Alt_L", Release), (100, "j", Press)],
    )
    .await;

    assert_eq!(report.sessions.len(), 1);
    assert_eq!(report.sessions[0].exit, ExitReason::SourceClosed);
    assert_eq!(report.grabs.last(), Some(&GrabEvent::TriggerDisabled));
    assert!(report.grabs.contains(&GrabEvent::KeyboardUngrabbed));
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_releases_held_button() {
    let mut config = Config::default();
    config.session.idle_timeout_secs = 60;

    let report = replay(&config, &[(0, "Alt_L", Release), (100, "f", Press)]).await;

    assert_eq!(
        report.actions,
        vec![
            PointerAction {
                at_ms: 100,
                kind: PointerActionKind::Press {
                    button: ClickButton::Left
                },
            },
            PointerAction {
                at_ms: 60_100,
                kind: PointerActionKind::Release {
                    button: ClickButton::Left
                },
            },
        ]
    );
    assert_eq!(report.sessions[0].exit, ExitReason::IdleTimeout);
    assert_eq!(report.sessions[0].button_events, 2);
}

#[tokio::test(start_paused = true)]
async fn test_trace_ending_with_button_held_releases_it() {
    let report = replay(
        &Config::default(),
        &[(0, "Alt_L", Release), (100, "s", Press)],
    )
    .await;

    let kinds: Vec<_> = report.actions.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PointerActionKind::Press {
                button: ClickButton::Right
            },
            PointerActionKind::Release {
                button: ClickButton::Right
            },
        ]
    );
    assert_eq!(report.sessions[0].exit, ExitReason::SourceClosed);
}

#[tokio::test(start_paused = true)]
async fn test_custom_bindings() {
    let mut config = Config::default();
    config.input.bindings.up = "Up".to_string();
    config.trigger.leave_key = "q".to_string();

    let report = replay(
        &config,
        &[
            (0, "Alt_L", Release),
            (100, "Up", Press),
            (310, "Up", Release),
            (400, "q", Release),
        ],
    )
    .await;

    assert_eq!(moves(&report), vec![(300, 0, -1)]);
    assert_eq!(report.sessions[0].exit, ExitReason::LeaveKey);
}

#[tokio::test(start_paused = true)]
async fn test_refused_grab_is_fatal() {
    let result = run_replay_with_grab(
        &Config::default(),
        &StaticKeyResolver::new(),
        &trace(&[(0, "Alt_L", Release)]),
        RecordingGrab::refusing(),
    )
    .await;

    assert!(matches!(result, Err(InputError::GrabFailed(_))));
}

#[tokio::test(start_paused = true)]
async fn test_load_trace_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"events":[
            {{"at_ms":0,"key":"Alt_L","kind":"release"}},
            {{"at_ms":100,"key":"d","kind":"press"}},
            {{"at_ms":200,"key":"d","kind":"release"}},
            {{"at_ms":300,"key":"Escape","kind":"release"}}
        ]}}"#
    )
    .unwrap();

    let trace = Trace::load(file.path()).unwrap();
    let report = run_replay(&Config::default(), &StaticKeyResolver::new(), &trace)
        .await
        .unwrap();

    let buttons: Vec<_> = report.actions.iter().map(|a| a.kind).collect();
    assert_eq!(
        buttons,
        vec![
            PointerActionKind::Press {
                button: ClickButton::Middle
            },
            PointerActionKind::Release {
                button: ClickButton::Middle
            },
        ]
    );
}
