use std::error::Error;

use feewatch_core::FeeApiClient;

use crate::common;

pub fn run() -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;
    let client = FeeApiClient::new()?;
    let range = rt.block_on(client.next_block_fee_range())?;
    println!("next block fee range: {} - {} sat/vB", range.min, range.max);
    Ok(())
}
