#![allow(dead_code)]

use core::future::Future;

use embassy_futures::block_on;
use embassy_futures::select::{Either, select};
use embassy_futures::yield_now;
use embassy_time::{Duration, MockDriver};
use rmk_trackball::action::ModeActionEvent;
use rmk_trackball::activity::WakeRequestEvent;
use rmk_trackball::event::SubscribableEvent;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Run `test` while `task` keeps running in the background.
///
/// `block_on` busy-polls, and `task` is polled before `test` on every round, so everything
/// published by `test` is seen by `task` after a few [`settle`] rounds.
pub fn run_with<T: Future, F: Future>(task: T, test: F) -> F::Output {
    block_on(async {
        match select(task, test).await {
            Either::First(_) => panic!("Background task exited"),
            Either::Second(output) => output,
        }
    })
}

/// Give the background task a few rounds to drain its channels
pub async fn settle() {
    for _ in 0..8 {
        yield_now().await;
    }
}

/// Advance the mock clock, then let the background task run its expired timers
pub async fn advance_ms(ms: u64) {
    MockDriver::get().advance(Duration::from_millis(ms));
    settle().await;
}

/// Drain the behavior queue
pub fn queued_actions() -> Vec<ModeActionEvent> {
    let receiver = ModeActionEvent::subscriber();
    let mut actions = Vec::new();
    while let Ok(action) = receiver.try_receive() {
        actions.push(action);
    }
    actions
}

/// Count and drain the wake requests
pub fn wake_requests() -> usize {
    let receiver = WakeRequestEvent::subscriber();
    let mut count = 0;
    while receiver.try_receive().is_ok() {
        count += 1;
    }
    count
}
