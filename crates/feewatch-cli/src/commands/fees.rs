use std::error::Error;

use feewatch_core::badge::level_from_value;
use feewatch_core::{FeeApiClient, Priority};

use crate::common;

pub fn run(json: bool) -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;
    let client = FeeApiClient::new()?;
    let fees = rt.block_on(client.recommended_fees())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&fees)?);
        return Ok(());
    }

    for priority in Priority::ALL {
        let value = fees.fee_for(priority);
        println!(
            "{:<18} {:>7} sat/vB  [{}]",
            priority.to_string(),
            value,
            level_from_value(value)
        );
    }
    Ok(())
}
