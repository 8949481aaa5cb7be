//! Environment and configuration review: store health, API
//! connectivity, and whether alerts can actually fire as configured.

use std::error::Error;

use feewatch_core::{FeeApiClient, Settings, SettingsStore};

use crate::common;

pub fn run() -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;

    match SettingsStore::open_default() {
        Ok(store) => {
            println!("settings file: {}", store.path().display());
            match store.settings() {
                Ok(settings) => {
                    println!("settings:      ok");
                    report_cache(&settings);
                    report_alert_setup(&settings);
                }
                Err(e) => println!("settings:      unreadable ({e})"),
            }
        }
        Err(e) => println!("config dir:    unavailable ({e})"),
    }

    let client = FeeApiClient::new()?;
    if rt.block_on(client.check_connectivity()) {
        println!("fee API:       reachable");
        match rt.block_on(client.block_height()) {
            Ok(height) => println!("block height:  {height}"),
            Err(e) => println!("block height:  unavailable ({e})"),
        }
    } else {
        println!("fee API:       unreachable");
        println!("  - check network connectivity; the watch loop retries every cycle");
    }
    Ok(())
}

fn report_cache(settings: &Settings) {
    if settings.last_update == 0 {
        println!("fee cache:     never populated");
    } else if settings.is_cache_fresh_at(common::now_ms()) {
        println!("fee cache:     fresh");
    } else {
        println!("fee cache:     stale (next successful fetch overwrites it)");
    }
}

fn report_alert_setup(settings: &Settings) {
    if !settings.notifications_enabled {
        println!("alerts:        disabled");
        println!("  - enable with `feewatch config set notifications_enabled true`");
        return;
    }
    match settings.alert_threshold {
        Some(t) => println!("alerts:        armed at {t} sat/vB"),
        None => {
            println!("alerts:        no threshold set, alerts will not fire");
            println!("  - set one with `feewatch config set alert_threshold <sat/vB>`");
        }
    }
}
