use color_eyre::eyre::Result;

use asmvm::{LogOutput, Machine};
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Program used when no path is given
const DEFAULT_PROGRAM: &str = "demos/programs/readme.asm";

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().with_level(LevelFilter::Info).init()?; // logging

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_owned());

    let mut machine = Machine::from_file(&path, LogOutput)?;
    machine.run()?;

    for (register, value) in machine.register_state().iter() {
        log::debug!("{} = {}", register, value);
    }
    log::info!("Flags: {:?}", machine.flag_state());

    Ok(())
}
