//! Entrypoint for CLI
use std::{env, error::Error, fs, time::Instant};

use chip8::{prelude::*, IMPL_VERSION};
use log::{error, info};

use self::{config::CliConfig, devices::HeadlessDevices};

mod config;
mod devices;

static USAGE: &str = r#"
usage: chip8 CMD FILE [CONFIG]

commands:
    run     Run the target ROM file, with an optional YAML config
    dis     Disassemble the target ROM into readable assembly

examples:
    chip8 run breakout.rom
    chip8 run breakout.rom headless.yaml
    chip8 dis breakout.rom
"#;

fn run_bytecode(filepath: &str, config_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let config = match config_path {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };
    let bytecode = fs::read(filepath)?;

    let mut vm = Chip8Vm::new(config.vm.clone());
    info!("running {filepath} with {:?}", vm.config());
    vm.load_bytecode(bytecode.as_slice())?;

    let mut devices = HeadlessDevices::new(config.key_state()?, config.frames);

    let start = Instant::now();
    let result = vm.execute(&mut devices);
    let end = Instant::now();

    println!(
        "time taken: {}ms, frames: {}, draws: {}",
        end.duration_since(start).as_nanos() as f64 / 1000000.0,
        devices.frames(),
        devices.draws(),
    ); // to millis
    println!("{}", vm.dump_display()?);

    if result.is_err() {
        println!("{}", vm.dump_stack()?);
    }
    result?;

    Ok(())
}

fn run_disassembler(filepath: &str) -> Result<(), Box<dyn Error>> {
    let bytecode = fs::read(filepath)?;

    let mut buf = String::new();
    Disassembler::new(bytecode.as_slice()).disassemble(&mut buf)?;
    print!("{buf}");

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let result = match parse_args() {
        Some(Cmd::Run { filepath, config }) => run_bytecode(&filepath, config.as_deref()),
        Some(Cmd::Dis { filepath }) => run_disassembler(&filepath),
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1)
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next() {
        Some(cmd) => match cmd.as_str() {
            "run" => Some(Cmd::Run {
                filepath: args.next()?,
                config: args.next(),
            }),
            "dis" => Some(Cmd::Dis {
                filepath: args.next()?,
            }),
            _ => None,
        },
        None => None,
    }
}

fn print_usage() {
    println!("Chip8 v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Run file
    Run {
        filepath: String,
        config: Option<String>,
    },
    /// Disassemble
    Dis { filepath: String },
}
