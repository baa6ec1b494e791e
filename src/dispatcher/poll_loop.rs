use super::{Dispatcher, DispatcherInner};
use chrono::Local;
use std::rc::{Rc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info};

impl Dispatcher {
    /// Changes the poll loop period; the running loop picks it up after
    /// its next tick.
    pub fn set_poll_rate(&self, poll_rate_ms: u64) {
        self.update_settings(|s| s.poll_rate_ms = poll_rate_ms);
    }

    /// Starts polling on the current `LocalSet`.
    ///
    /// The loop holds no strong reference: it ends once the dispatcher is
    /// disposed or its last handle is dropped. Ticks are skipped while
    /// `auto_poll` is off or the dispatcher is disabled.
    pub fn spawn_poll_loop(&self) -> JoinHandle<()> {
        let weak = Rc::downgrade(&self.inner);
        tokio::task::spawn_local(run_poll_loop(weak))
    }
}

async fn run_poll_loop(weak: Weak<DispatcherInner>) {
    let Some(period) = weak
        .upgrade()
        .map(|inner| inner.settings.get().poll_rate_ms)
    else {
        return;
    };
    info!("Starting poll loop with {}ms interval", period);

    let mut interval_timer =
        tokio::time::interval(tokio::time::Duration::from_millis(period));
    let mut ticks: u64 = 0;
    let mut last_stats_time = Local::now();
    let stats_interval = chrono::Duration::seconds(30);

    loop {
        interval_timer.tick().await;

        let Some(inner) = weak.upgrade() else {
            debug!("Dispatcher dropped, ending poll loop");
            break;
        };
        let dispatcher = Dispatcher::from_inner(inner);
        if dispatcher.is_disposed() {
            info!("Dispatcher {} disposed, ending poll loop", dispatcher.id());
            break;
        }

        let settings = dispatcher.settings();
        if settings.auto_poll {
            dispatcher.poll();
            ticks += 1;
        }

        let now = Local::now();
        if now - last_stats_time > stats_interval {
            debug!(
                "Dispatcher {} polled {} times in {} seconds",
                dispatcher.id(),
                ticks,
                (now - last_stats_time).num_seconds()
            );
            ticks = 0;
            last_stats_time = now;
        }

        let new_interval_time = tokio::time::Duration::from_millis(settings.poll_rate_ms);
        if new_interval_time != interval_timer.period() {
            info!("Updating interval time to {} ms", settings.poll_rate_ms);
            interval_timer = tokio::time::interval(new_interval_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::component::codes::keyboard;
    use crate::config::DispatcherSettings;
    use crate::dispatcher::{Control, Dispatcher};
    use crate::hub::InputHub;
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio::task::LocalSet;
    use tokio::time::{sleep, Duration};

    fn fast() -> DispatcherSettings {
        DispatcherSettings {
            poll_rate_ms: 5,
            ..DispatcherSettings::default()
        }
    }

    #[tokio::test]
    async fn loop_holds_pressed_keys() {
        LocalSet::new()
            .run_until(async {
                let hub = InputHub::new();
                let d = Dispatcher::with_settings(&hub, fast());
                let holds = Rc::new(Cell::new(0));
                let counter = holds.clone();
                let control = Control::builder()
                    .on_hold(move |_| counter.set(counter.get() + 1))
                    .build();
                d.bind(&control, keyboard::SPACE);
                d.key_down(keyboard::SPACE);

                let handle = d.spawn_poll_loop();
                sleep(Duration::from_millis(60)).await;
                assert!(holds.get() > 0);

                d.dispose();
                handle.await.ok();
            })
            .await;
    }

    #[tokio::test]
    async fn loop_ends_when_dispatcher_is_dropped() {
        LocalSet::new()
            .run_until(async {
                let hub = InputHub::new();
                let d = Dispatcher::with_settings(&hub, fast());
                let handle = d.spawn_poll_loop();
                drop(d);
                let finished = tokio::time::timeout(Duration::from_secs(1), handle).await;
                assert!(finished.is_ok());
            })
            .await;
    }

    #[tokio::test]
    async fn auto_poll_off_skips_ticks() {
        LocalSet::new()
            .run_until(async {
                let hub = InputHub::new();
                let d = Dispatcher::with_settings(
                    &hub,
                    DispatcherSettings {
                        auto_poll: false,
                        ..fast()
                    },
                );
                let holds = Rc::new(Cell::new(0));
                let counter = holds.clone();
                let control = Control::builder()
                    .on_hold(move |_| counter.set(counter.get() + 1))
                    .build();
                d.bind(&control, keyboard::SPACE);
                d.key_down(keyboard::SPACE);

                let handle = d.spawn_poll_loop();
                sleep(Duration::from_millis(30)).await;
                assert_eq!(holds.get(), 0);

                d.dispose();
                handle.await.ok();
            })
            .await;
    }

    #[tokio::test]
    async fn loop_follows_poll_rate_changes() {
        LocalSet::new()
            .run_until(async {
                let hub = InputHub::new();
                let d = Dispatcher::with_settings(&hub, fast());
                let holds = Rc::new(Cell::new(0));
                let counter = holds.clone();
                let control = Control::builder()
                    .on_hold(move |_| counter.set(counter.get() + 1))
                    .build();
                d.bind(&control, keyboard::SPACE);
                d.key_down(keyboard::SPACE);

                let handle = d.spawn_poll_loop();
                sleep(Duration::from_millis(30)).await;
                assert!(holds.get() > 1);

                d.set_poll_rate(60_000);
                sleep(Duration::from_millis(30)).await;
                let settled = holds.get();
                sleep(Duration::from_millis(60)).await;
                assert_eq!(holds.get(), settled);

                d.dispose();
                handle.abort();
            })
            .await;
    }

    #[test]
    fn zero_poll_rate_is_lifted() {
        let hub = InputHub::new();
        let d = Dispatcher::with_settings(&hub, fast());
        d.set_poll_rate(0);
        assert_eq!(d.settings().poll_rate_ms, 1);
    }
}
