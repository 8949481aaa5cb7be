//! Synchronization engine.
//!
//! The periodic driver tying the fee client, the settings store, the
//! badge policy and the alert machine together. One engine instance
//! reacts to three serially-delivered signals; each cycle commits
//! cache, badge and alert state in a strict sequence, and every step
//! failure is isolated -- nothing escapes `handle_signal`.

use chrono::Utc;
use tracing::{debug, warn};

use crate::alert;
use crate::api::FeeApiClient;
use crate::badge;
use crate::events::Event;
use crate::fees::FeeSnapshot;
use crate::now_ms;
use crate::sinks::{BadgeSink, NotificationSink};
use crate::storage::{Settings, SettingsStore};

/// Fixed cadence of the periodic fetch cycle, in seconds.
pub const UPDATE_INTERVAL_SECS: u64 = 30;

/// Identity of the single alert notification.
pub const ALERT_NOTIFICATION_ID: &str = "feewatch_fee_alert";

pub const ALERT_TITLE: &str = "BTC Fee Alert";

fn alert_message(fee: f64) -> String {
    format!(
        "Bitcoin fees dropped to {} sat/vB - great time to transact!",
        fee.round() as i64
    )
}

/// Inbound signals. The host delivers them one at a time; a signal
/// arriving mid-cycle queues behind the current one.
#[derive(Debug, Clone)]
pub enum Signal {
    /// Periodic timer fired.
    Tick,
    /// Explicit "update now" request.
    RefreshRequested,
    /// The settings record changed externally.
    SettingsChanged { old: Settings, new: Settings },
}

enum ChangeKind {
    /// Only engine-written fields (cache, alert bookkeeping) differ.
    Internal,
    /// Only the priority tier and/or badge visibility differ.
    DisplayOnly,
    /// Anything the alert machine reads differs.
    Substantive,
}

fn classify_change(old: &Settings, new: &Settings) -> ChangeKind {
    if old.notifications_enabled != new.notifications_enabled
        || old.alert_threshold != new.alert_threshold
    {
        ChangeKind::Substantive
    } else if old.selected_priority != new.selected_priority
        || old.badge_visible != new.badge_visible
    {
        ChangeKind::DisplayOnly
    } else {
        ChangeKind::Internal
    }
}

/// The orchestrator. Owns its collaborators; generic over the host
/// sinks so frontends and tests supply their own surfaces.
pub struct SyncEngine<B: BadgeSink, N: NotificationSink> {
    client: FeeApiClient,
    store: SettingsStore,
    badge: B,
    notifier: N,
}

impl<B: BadgeSink, N: NotificationSink> SyncEngine<B, N> {
    pub fn new(client: FeeApiClient, store: SettingsStore, badge: B, notifier: N) -> Self {
        Self {
            client,
            store,
            badge,
            notifier,
        }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn badge_sink(&self) -> &B {
        &self.badge
    }

    pub fn notification_sink(&self) -> &N {
        &self.notifier
    }

    /// Single entry point for all inbound signals.
    pub async fn handle_signal(&mut self, signal: Signal) -> Vec<Event> {
        match signal {
            Signal::Tick | Signal::RefreshRequested => self.run_cycle().await,
            Signal::SettingsChanged { old, new } => match classify_change(&old, &new) {
                ChangeKind::Internal => Vec::new(),
                ChangeKind::DisplayOnly => self.refresh_display().await,
                ChangeKind::Substantive => self.run_cycle().await,
            },
        }
    }

    /// Full cycle: fetch, cache, badge, alert.
    pub async fn run_cycle(&mut self) -> Vec<Event> {
        let mut events = Vec::new();

        let settings = match self.store.settings() {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "settings unavailable, skipping cycle");
                return events;
            }
        };

        let fees = match self.client.recommended_fees().await {
            Ok(fees) => fees,
            Err(err) => {
                warn!(error = %err, "fee fetch failed, leaving cache untouched");
                self.show_error_badge(&settings);
                events.push(Event::FetchFailed {
                    reason: err.to_string(),
                    at: Utc::now(),
                });
                return events;
            }
        };
        debug!(
            fastest = fees.fastest,
            half_hour = fees.half_hour,
            hour = fees.hour,
            "fetched recommended fees"
        );
        events.push(Event::FeesUpdated {
            fees,
            at: Utc::now(),
        });

        if let Err(err) = self.store.cache_snapshot(&fees) {
            warn!(error = %err, "failed to cache fee snapshot");
        }

        self.render_badge(&fees, &settings, &mut events);
        self.evaluate_alert(&fees, &settings, &mut events);
        events
    }

    /// Display-only settings change: re-render from the cached snapshot
    /// instead of a network round trip. Falls back to a full cycle when
    /// the cache is stale or absent.
    async fn refresh_display(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let settings = match self.store.settings() {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "settings unavailable, skipping display refresh");
                return events;
            }
        };
        match settings.cached_fees_at(now_ms()) {
            Some(fees) => {
                self.render_badge(&fees, &settings, &mut events);
                events
            }
            None => {
                debug!("no fresh cache for display refresh, running a full cycle");
                self.run_cycle().await
            }
        }
    }

    fn render_badge(&mut self, fees: &FeeSnapshot, settings: &Settings, events: &mut Vec<Event>) {
        if !settings.badge_visible {
            match self.badge.clear_badge() {
                Ok(()) => events.push(Event::BadgeCleared { at: Utc::now() }),
                Err(err) => warn!(error = %err, "failed to clear badge"),
            }
            return;
        }
        let config = badge::compute_badge(fees, settings);
        match self
            .badge
            .set_badge(&config.text, &config.background_color, &config.color)
        {
            Ok(()) => events.push(Event::BadgeUpdated {
                text: config.text,
                level: config.level,
                at: Utc::now(),
            }),
            Err(err) => warn!(error = %err, "failed to render badge"),
        }
    }

    /// Distinct "unknown" indicator while the fee source is unreachable.
    /// A hidden badge stays hidden even on failure.
    fn show_error_badge(&mut self, settings: &Settings) {
        let result = if settings.badge_visible {
            self.badge
                .set_badge(badge::ERROR_BADGE_TEXT, badge::COLOR_ERROR, badge::COLOR_TEXT)
        } else {
            self.badge.clear_badge()
        };
        if let Err(err) = result {
            warn!(error = %err, "failed to update badge after fetch failure");
        }
    }

    fn evaluate_alert(&mut self, fees: &FeeSnapshot, settings: &Settings, events: &mut Vec<Event>) {
        let fee = fees.fee_for(settings.selected_priority);
        let eval = alert::evaluate(fee, settings, now_ms());
        if eval.is_noop() {
            return;
        }

        // Persist the transition first: firing without a recorded
        // cooldown could repeat the alert every cycle.
        if let Err(err) = self.store.update_with(|s| {
            if let Some(state) = eval.new_state {
                s.last_alert_state = Some(state);
            }
            if let Some(t) = eval.notified_at {
                s.last_notification_time = Some(t);
            }
        }) {
            warn!(error = %err, "failed to persist alert state, suppressing alert");
            return;
        }

        if eval.fire {
            // At most one alert notification visible at a time.
            if let Err(err) = self.notifier.clear(ALERT_NOTIFICATION_ID) {
                debug!(error = %err, "failed to clear previous alert notification");
            }
            match self
                .notifier
                .notify(ALERT_NOTIFICATION_ID, ALERT_TITLE, &alert_message(fee))
            {
                Ok(()) => events.push(Event::AlertFired {
                    fee,
                    threshold: settings.alert_threshold.unwrap_or_default(),
                    at: Utc::now(),
                }),
                Err(err) => warn!(error = %err, "failed to dispatch alert notification"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::fees::Priority;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingBadge {
        sets: Vec<(String, String, String)>,
        clears: usize,
    }

    impl BadgeSink for RecordingBadge {
        fn set_badge(
            &mut self,
            text: &str,
            background: &str,
            foreground: &str,
        ) -> Result<(), SinkError> {
            self.sets
                .push((text.to_string(), background.to_string(), foreground.to_string()));
            Ok(())
        }

        fn clear_badge(&mut self) -> Result<(), SinkError> {
            self.clears += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        shown: Vec<(String, String, String)>,
        cleared: Vec<String>,
    }

    impl NotificationSink for RecordingNotifier {
        fn notify(&mut self, id: &str, title: &str, message: &str) -> Result<(), SinkError> {
            self.shown
                .push((id.to_string(), title.to_string(), message.to_string()));
            Ok(())
        }

        fn clear(&mut self, id: &str) -> Result<(), SinkError> {
            self.cleared.push(id.to_string());
            Ok(())
        }
    }

    const FEES_BODY: &str = r#"{"fastestFee": 42, "halfHourFee": 21, "hourFee": 10}"#;

    fn engine_for(
        server: &mockito::ServerGuard,
        dir: &TempDir,
    ) -> SyncEngine<RecordingBadge, RecordingNotifier> {
        let client = FeeApiClient::with_base_url(&server.url()).unwrap();
        let store = SettingsStore::at_path(dir.path().join("settings.toml"));
        SyncEngine::new(
            client,
            store,
            RecordingBadge::default(),
            RecordingNotifier::default(),
        )
    }

    #[tokio::test]
    async fn successful_cycle_caches_and_renders() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(FEES_BODY)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let mut engine = engine_for(&server, &dir);

        let events = engine.handle_signal(Signal::Tick).await;

        let cached = engine.store().cached_fees().unwrap().unwrap();
        assert_eq!(cached.half_hour, 21.0);

        // Default priority is half-hour: amber badge with "21".
        let (text, bg, _fg) = engine.badge_sink().sets.last().unwrap().clone();
        assert_eq!(text, "21");
        assert_eq!(bg, badge::COLOR_MEDIUM);

        assert!(events.iter().any(|e| matches!(e, Event::FeesUpdated { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::BadgeUpdated { .. })));
    }

    #[tokio::test]
    async fn fetch_failure_preserves_cache_and_shows_error_badge() {
        let mut server = mockito::Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let mut engine = engine_for(&server, &dir);

        let fees = FeeSnapshot {
            fastest: 42.0,
            half_hour: 21.0,
            hour: 10.0,
        };
        engine.store().cache_snapshot(&fees).unwrap();

        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(500)
            .create_async()
            .await;

        let events = engine.handle_signal(Signal::Tick).await;

        assert!(events.iter().any(|e| matches!(e, Event::FetchFailed { .. })));
        let (text, bg, _fg) = engine.badge_sink().sets.last().unwrap().clone();
        assert_eq!(text, badge::ERROR_BADGE_TEXT);
        assert_eq!(bg, badge::COLOR_ERROR);
        // Stale-but-present cache untouched.
        assert_eq!(engine.store().settings().unwrap().cached_fees, Some(fees));
    }

    #[tokio::test]
    async fn hidden_badge_is_cleared_instead_of_rendered() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(FEES_BODY)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let mut engine = engine_for(&server, &dir);
        engine
            .store()
            .update_with(|s| s.badge_visible = false)
            .unwrap();

        let events = engine.handle_signal(Signal::Tick).await;

        assert!(engine.badge_sink().sets.is_empty());
        assert_eq!(engine.badge_sink().clears, 1);
        assert!(events.iter().any(|e| matches!(e, Event::BadgeCleared { .. })));
    }

    #[tokio::test]
    async fn alert_fires_once_and_clears_previous_notification() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(FEES_BODY)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let mut engine = engine_for(&server, &dir);
        engine
            .store()
            .update_with(|s| s.alert_threshold = Some(100.0))
            .unwrap();

        let events = engine.handle_signal(Signal::Tick).await;
        assert!(events.iter().any(|e| matches!(e, Event::AlertFired { .. })));

        let notifier = engine.notification_sink();
        assert_eq!(notifier.cleared, vec![ALERT_NOTIFICATION_ID.to_string()]);
        assert_eq!(notifier.shown.len(), 1);
        let (id, title, message) = notifier.shown[0].clone();
        assert_eq!(id, ALERT_NOTIFICATION_ID);
        assert_eq!(title, ALERT_TITLE);
        assert!(message.contains("21 sat/vB"));

        // Fees still below on the next cycle: no repeat alert.
        let events = engine.handle_signal(Signal::Tick).await;
        assert!(!events.iter().any(|e| matches!(e, Event::AlertFired { .. })));
        assert_eq!(engine.notification_sink().shown.len(), 1);
    }

    #[tokio::test]
    async fn display_only_change_skips_the_network() {
        let mut server = mockito::Server::new_async().await;
        let never_called = server
            .mock("GET", "/fees/recommended")
            .expect(0)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let mut engine = engine_for(&server, &dir);

        let fees = FeeSnapshot {
            fastest: 42.0,
            half_hour: 21.0,
            hour: 10.0,
        };
        engine.store().cache_snapshot(&fees).unwrap();
        let old = engine.store().settings().unwrap();
        let new = engine
            .store()
            .update_with(|s| s.selected_priority = Priority::Hour)
            .unwrap();

        let events = engine
            .handle_signal(Signal::SettingsChanged { old, new })
            .await;

        never_called.assert_async().await;
        let (text, bg, _fg) = engine.badge_sink().sets.last().unwrap().clone();
        assert_eq!(text, "10");
        assert_eq!(bg, badge::COLOR_LOW);
        assert!(events.iter().any(|e| matches!(e, Event::BadgeUpdated { .. })));
    }

    #[tokio::test]
    async fn threshold_change_runs_a_full_cycle() {
        let mut server = mockito::Server::new_async().await;
        let fetch = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(FEES_BODY)
            .expect(1)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let mut engine = engine_for(&server, &dir);

        let old = engine.store().settings().unwrap();
        let new = engine
            .store()
            .update_with(|s| s.alert_threshold = Some(30.0))
            .unwrap();

        let events = engine
            .handle_signal(Signal::SettingsChanged { old, new })
            .await;

        fetch.assert_async().await;
        // Threshold 30 with half-hour fee 21: first evaluation fires.
        assert!(events.iter().any(|e| matches!(e, Event::AlertFired { .. })));
    }

    #[tokio::test]
    async fn engine_written_fields_do_not_trigger_work() {
        let mut server = mockito::Server::new_async().await;
        let never_called = server
            .mock("GET", "/fees/recommended")
            .expect(0)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let mut engine = engine_for(&server, &dir);

        let old = engine.store().settings().unwrap();
        let fees = FeeSnapshot {
            fastest: 1.0,
            half_hour: 1.0,
            hour: 1.0,
        };
        engine.store().cache_snapshot(&fees).unwrap();
        let new = engine.store().settings().unwrap();

        let events = engine
            .handle_signal(Signal::SettingsChanged { old, new })
            .await;

        never_called.assert_async().await;
        assert!(events.is_empty());
        assert!(engine.badge_sink().sets.is_empty());
    }

    #[tokio::test]
    async fn display_refresh_with_stale_cache_falls_back_to_fetch() {
        let mut server = mockito::Server::new_async().await;
        let fetch = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(FEES_BODY)
            .expect(1)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let mut engine = engine_for(&server, &dir);

        // No cache at all; a priority flip cannot render locally.
        let old = engine.store().settings().unwrap();
        let new = engine
            .store()
            .update_with(|s| s.selected_priority = Priority::Fastest)
            .unwrap();

        let events = engine
            .handle_signal(Signal::SettingsChanged { old, new })
            .await;

        fetch.assert_async().await;
        assert!(events.iter().any(|e| matches!(e, Event::FeesUpdated { .. })));
        let (text, _bg, _fg) = engine.badge_sink().sets.last().unwrap().clone();
        assert_eq!(text, "42");
    }
}
