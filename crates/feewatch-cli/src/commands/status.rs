use std::error::Error;

use chrono::DateTime;
use feewatch_core::badge::compute_badge;
use feewatch_core::{AlertSide, BadgeConfig, Settings, SettingsStore};
use serde::Serialize;

use crate::common;

#[derive(Serialize)]
struct StatusReport {
    #[serde(flatten)]
    settings: Settings,
    cache_fresh: bool,
    badge_preview: Option<BadgeConfig>,
}

pub fn run(json: bool) -> Result<(), Box<dyn Error>> {
    let store = SettingsStore::open_default()?;
    let settings = store.settings()?;
    let now = common::now_ms();

    let badge_preview = settings
        .cached_fees_at(now)
        .map(|fees| compute_badge(&fees, &settings));

    if json {
        let report = StatusReport {
            cache_fresh: settings.is_cache_fresh_at(now),
            badge_preview,
            settings,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("settings file:   {}", store.path().display());
    println!("priority:        {}", settings.selected_priority);
    println!(
        "notifications:   {}",
        if settings.notifications_enabled { "on" } else { "off" }
    );
    println!(
        "badge:           {}",
        if settings.badge_visible { "visible" } else { "hidden" }
    );
    match settings.alert_threshold {
        Some(t) => println!("alert threshold: {t} sat/vB"),
        None => println!("alert threshold: not set"),
    }
    match settings.last_alert_state {
        Some(AlertSide::Above) => println!("alert state:     above threshold"),
        Some(AlertSide::Below) => println!("alert state:     below threshold"),
        None => {}
    }

    if settings.last_update == 0 {
        println!("last update:     never");
    } else {
        let age = common::format_age(now.saturating_sub(settings.last_update));
        match DateTime::from_timestamp_millis(settings.last_update as i64) {
            Some(when) => println!(
                "last update:     {age} ({})",
                when.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!("last update:     {age}"),
        }
    }

    match badge_preview {
        Some(badge) => {
            println!("cache:           fresh");
            println!(
                "badge preview:   \"{}\" ({} on {})",
                badge.text, badge.level, badge.background_color
            );
        }
        None => println!("cache:           stale or empty"),
    }
    Ok(())
}
