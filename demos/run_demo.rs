use std::io;

use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ls8::config::MachineConfig;
use ls8::machine::Machine;
use ls8::memory::StdMem;

/// Programs under `demos/programs`, run in order
const PROGRAMS: &[&str] = &["print8", "mult", "stack", "call", "cmp"];

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .wrap_err("failed to initialize logging")?; // logging

    for name in PROGRAMS {
        let path = format!("{}/demos/programs/{}.ls8", env!("CARGO_MANIFEST_DIR"), name);
        let mem = StdMem::from_file(&path)?;

        println!("== {}", name);
        let stdout = io::stdout();
        let mut machine = Machine::new(mem, MachineConfig::default(), stdout.lock());
        machine.run().wrap_err_with(|| format!("{} failed", name))?;
    }

    Ok(())
}
