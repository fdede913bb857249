//! Leptos Interval Utilities
//!
//! Cancellable periodic tasks for Leptos components.
//! A task is started on mount and stopped from `on_cleanup`, so no timer
//! outlives the component that created it.

use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Interval;
use leptos::prelude::*;

/// Source of repeating timers; dropping the returned timer cancels it
pub trait Scheduler: 'static {
    type Timer: 'static;

    fn every(&self, period_ms: u32, tick: Rc<dyn Fn()>) -> Self::Timer;
}

/// `setInterval` through gloo
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Timer = Interval;

    fn every(&self, period_ms: u32, tick: Rc<dyn Fn()>) -> Interval {
        Interval::new(period_ms, move || tick())
    }
}

/// Handle to a periodic task
///
/// Copy-able so it can be moved into event handlers and cleanup closures.
pub struct IntervalHandle<S: Scheduler = BrowserScheduler> {
    timer: StoredValue<Option<S::Timer>, LocalStorage>,
    tick: StoredValue<Rc<dyn Fn()>, LocalStorage>,
    scheduler: StoredValue<S, LocalStorage>,
    period_ms: u32,
}

impl<S: Scheduler> Clone for IntervalHandle<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Scheduler> Copy for IntervalHandle<S> {}

impl IntervalHandle {
    /// Create a stopped task that runs `tick` every `period` once started
    pub fn new(period: Duration, tick: impl Fn() + 'static) -> Self {
        Self::with_scheduler(BrowserScheduler, period, tick)
    }
}

impl<S: Scheduler> IntervalHandle<S> {
    pub fn with_scheduler(scheduler: S, period: Duration, tick: impl Fn() + 'static) -> Self {
        let tick: Rc<dyn Fn()> = Rc::new(tick);
        Self {
            timer: StoredValue::new_local(None),
            tick: StoredValue::new_local(tick),
            scheduler: StoredValue::new_local(scheduler),
            period_ms: period_millis(period),
        }
    }

    /// Start ticking. No-op if already running.
    pub fn start(&self) {
        if self.is_running() {
            return;
        }
        let Some(tick) = self.tick.try_get_value() else {
            return;
        };
        let period_ms = self.period_ms;
        let Some(timer) = self.scheduler.try_with_value(|s| s.every(period_ms, tick)) else {
            return;
        };
        self.timer.try_set_value(Some(timer));
    }

    /// Stop ticking. Dropping the timer clears it.
    pub fn stop(&self) {
        self.timer.try_update_value(|timer| {
            timer.take();
        });
    }

    /// Stop and start again, resetting the phase of the period
    pub fn restart(&self) {
        self.stop();
        self.start();
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .try_with_value(|timer| timer.is_some())
            .unwrap_or(false)
    }
}

/// Start a periodic task bound to the current reactive owner
///
/// The task is stopped when the owner is cleaned up (component unmount).
pub fn use_interval(period: Duration, tick: impl Fn() + 'static) -> IntervalHandle {
    use_interval_with(BrowserScheduler, period, tick)
}

pub fn use_interval_with<S: Scheduler>(
    scheduler: S,
    period: Duration,
    tick: impl Fn() + 'static,
) -> IntervalHandle<S> {
    let handle = IntervalHandle::with_scheduler(scheduler, period, tick);
    handle.start();
    on_cleanup(move || handle.stop());
    handle
}

/// Browser timers take a u32 millisecond period; zero would spin.
fn period_millis(period: Duration) -> u32 {
    let ms = period.as_millis().clamp(1, u128::from(u32::MAX));
    ms as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::reactive::owner::Owner;
    use std::cell::{Cell, RefCell};

    /// Counts live timers and keeps the last tick so tests can fire it
    #[derive(Clone, Default)]
    struct ManualScheduler {
        live: Rc<Cell<usize>>,
        started: Rc<Cell<usize>>,
        period_ms: Rc<Cell<u32>>,
        tick: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
    }

    struct ManualTimer(Rc<Cell<usize>>);

    impl Drop for ManualTimer {
        fn drop(&mut self) {
            self.0.set(self.0.get() - 1);
        }
    }

    impl Scheduler for ManualScheduler {
        type Timer = ManualTimer;

        fn every(&self, period_ms: u32, tick: Rc<dyn Fn()>) -> ManualTimer {
            self.live.set(self.live.get() + 1);
            self.started.set(self.started.get() + 1);
            self.period_ms.set(period_ms);
            *self.tick.borrow_mut() = Some(tick);
            ManualTimer(self.live.clone())
        }
    }

    impl ManualScheduler {
        fn fire(&self) {
            let tick = self.tick.borrow().clone();
            if let Some(tick) = tick {
                tick();
            }
        }
    }

    #[test]
    fn period_is_clamped_to_timer_range() {
        assert_eq!(period_millis(Duration::from_secs(30)), 30_000);
        assert_eq!(period_millis(Duration::ZERO), 1);
        assert_eq!(period_millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }

    #[test]
    fn start_is_idempotent_and_stop_clears() {
        let owner = Owner::new();
        owner.with(|| {
            let scheduler = ManualScheduler::default();
            let count = Rc::new(Cell::new(0));
            let ticks = count.clone();
            let handle = IntervalHandle::with_scheduler(
                scheduler.clone(),
                Duration::from_secs(30),
                move || ticks.set(ticks.get() + 1),
            );
            assert!(!handle.is_running());

            handle.start();
            handle.start();
            assert!(handle.is_running());
            assert_eq!(scheduler.started.get(), 1);
            assert_eq!(scheduler.period_ms.get(), 30_000);

            scheduler.fire();
            scheduler.fire();
            assert_eq!(count.get(), 2);

            handle.stop();
            assert!(!handle.is_running());
            assert_eq!(scheduler.live.get(), 0);

            handle.restart();
            assert!(handle.is_running());
            assert_eq!(scheduler.started.get(), 2);
            assert_eq!(scheduler.live.get(), 1);
        });
    }

    #[test]
    fn restart_replaces_the_running_timer() {
        let owner = Owner::new();
        owner.with(|| {
            let scheduler = ManualScheduler::default();
            let handle = IntervalHandle::with_scheduler(scheduler.clone(), Duration::from_secs(1), || {});
            handle.start();
            handle.restart();
            assert_eq!(scheduler.started.get(), 2);
            assert_eq!(scheduler.live.get(), 1);
        });
    }

    #[test]
    fn owner_cleanup_stops_the_task() {
        let owner = Owner::new();
        let scheduler = ManualScheduler::default();
        let handle = owner.with(|| {
            use_interval_with(scheduler.clone(), Duration::from_secs(60), || {})
        });
        assert!(handle.is_running());
        assert_eq!(scheduler.live.get(), 1);

        owner.cleanup();
        assert_eq!(scheduler.live.get(), 0);
        assert!(!handle.is_running());
        // a late call from a stale handler is harmless
        handle.start();
        assert_eq!(scheduler.live.get(), 0);
    }
}
