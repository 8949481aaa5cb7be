use std::error::Error;

use feewatch_core::FeeApiClient;

use crate::common;

pub fn run() -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;
    let client = FeeApiClient::new()?;
    let height = rt.block_on(client.block_height())?;
    println!("{height}");
    Ok(())
}
