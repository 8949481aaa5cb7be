//! The watch loop: terminal frontend for the sync engine.
//!
//! Drives the engine on a fixed tick and polls the settings file so
//! that `feewatch config set` from another terminal becomes a
//! settings-changed signal without waiting for the next tick.

use std::error::Error;
use std::time::Duration;

use feewatch_core::error::SinkError;
use feewatch_core::sinks::{BadgeSink, NotificationSink};
use feewatch_core::{Event, FeeApiClient, SettingsStore, Signal, SyncEngine};

use crate::common;

const SETTINGS_POLL_SECS: u64 = 2;

/// Renders the badge as a colored cell on stdout. Re-rendering an
/// unchanged badge is skipped to keep the stream readable.
#[derive(Default)]
struct TerminalBadge {
    last: Option<String>,
}

impl BadgeSink for TerminalBadge {
    fn set_badge(
        &mut self,
        text: &str,
        background: &str,
        foreground: &str,
    ) -> Result<(), SinkError> {
        let line = match (
            common::parse_hex_color(background),
            common::parse_hex_color(foreground),
        ) {
            (Some((br, bg, bb)), Some((fr, fg, fb))) => format!(
                "badge \x1b[48;2;{br};{bg};{bb}m\x1b[38;2;{fr};{fg};{fb}m {text} \x1b[0m"
            ),
            _ => format!("badge [{text}]"),
        };
        if self.last.as_deref() != Some(&line) {
            println!("{line}");
            self.last = Some(line);
        }
        Ok(())
    }

    fn clear_badge(&mut self) -> Result<(), SinkError> {
        if self.last.take().is_some() {
            println!("badge cleared");
        }
        Ok(())
    }
}

/// Prints alert notifications with a terminal bell.
struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn notify(&mut self, _id: &str, title: &str, message: &str) -> Result<(), SinkError> {
        println!("\x07[{title}] {message}");
        Ok(())
    }

    fn clear(&mut self, _id: &str) -> Result<(), SinkError> {
        // Nothing persistent to dismiss on a terminal.
        Ok(())
    }
}

fn print_event(event: &Event) {
    match event {
        Event::FeesUpdated { fees, at } => println!(
            "{} fees: fastest {} | half-hour {} | hour {} sat/vB",
            at.format("%H:%M:%S"),
            fees.fastest,
            fees.half_hour,
            fees.hour
        ),
        Event::FetchFailed { reason, at } => {
            println!("{} fetch failed: {reason}", at.format("%H:%M:%S"));
        }
        Event::AlertFired { fee, threshold, at } => println!(
            "{} alert: fee {fee} sat/vB at or below threshold {threshold}",
            at.format("%H:%M:%S")
        ),
        // The badge sink already drew these.
        Event::BadgeUpdated { .. } | Event::BadgeCleared { .. } => {}
    }
}

pub fn run(interval_secs: u64, once: bool) -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;
    let result: Result<(), Box<dyn Error>> = rt.block_on(async move {
        let client = FeeApiClient::new()?;
        let store = SettingsStore::open_default()?;
        let mut engine = SyncEngine::new(client, store, TerminalBadge::default(), TerminalNotifier);

        for event in engine.handle_signal(Signal::Tick).await {
            print_event(&event);
        }
        if once {
            return Ok(());
        }

        let mut last_seen = engine.store().settings()?;
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await; // the immediate first tick; the initial cycle already ran
        let mut settings_poll = tokio::time::interval(Duration::from_secs(SETTINGS_POLL_SECS));
        settings_poll.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for event in engine.handle_signal(Signal::Tick).await {
                        print_event(&event);
                    }
                    if let Ok(current) = engine.store().settings() {
                        last_seen = current;
                    }
                }
                _ = settings_poll.tick() => {
                    let Ok(current) = engine.store().settings() else { continue };
                    if current != last_seen {
                        let old = std::mem::replace(&mut last_seen, current.clone());
                        for event in engine
                            .handle_signal(Signal::SettingsChanged { old, new: current })
                            .await
                        {
                            print_event(&event);
                        }
                        // The engine may have written during handling.
                        if let Ok(current) = engine.store().settings() {
                            last_seen = current;
                        }
                    }
                }
            }
        }
    });
    result
}
