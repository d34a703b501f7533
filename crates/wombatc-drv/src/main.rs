use std::process::exit;

use tracing_subscriber::filter::LevelFilter;

use wombatc_drv::{parse_args, CliRequest, Session, Verbosity, USAGE, VERSION};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match parse_args(&args) {
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("{USAGE}");
            exit(2);
        }
        Ok(CliRequest::Version) => println!("wombatc {VERSION}"),
        Ok(CliRequest::Help) => println!("{USAGE}"),
        Ok(CliRequest::Build(config)) => {
            init_tracing(config.verbosity);
            if let Err(err) = Session::new(config).run() {
                eprintln!("error: {err:#}");
                exit(1);
            }
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    let level = match verbosity {
        Verbosity::Quiet => LevelFilter::OFF,
        Verbosity::Normal => LevelFilter::WARN,
        Verbosity::Verbose => LevelFilter::INFO,
        Verbosity::Debug => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
