use std::{env, io, process};

use color_eyre::eyre::{Result, WrapErr};
use log::*;
use simple_logger::SimpleLogger;

use ls8::config::Config;
use ls8::error::EXIT_LOAD;
use ls8::machine::Machine;
use ls8::memory::StdMem;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling

    let mut args = env::args_os();
    let bin = args
        .next()
        .map(|bin| bin.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ls8".to_owned());

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}: {}", bin, err);
            eprintln!("{}", Config::usage(&bin));
            process::exit(EXIT_LOAD);
        }
    };

    SimpleLogger::new()
        .with_level(config.log_level)
        .init()
        .wrap_err("failed to initialize logging")?;

    let memory = match StdMem::from_file(&config.program) {
        Ok(memory) => memory,
        Err(err) => {
            eprintln!("{}: {}", bin, err);
            process::exit(err.exit_code());
        }
    };
    debug!("Memory after loading:\n{}", memory.dump());

    let stdout = io::stdout();
    let mut machine = Machine::new(memory, config.machine, stdout.lock());

    if let Err(err) = machine.run() {
        eprintln!("{}: {}", bin, err);
        process::exit(err.exit_code());
    }

    Ok(())
}
