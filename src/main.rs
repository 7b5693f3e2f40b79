use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use questlog::cli::commands::Cli;
use questlog::cli::handlers;

/// Log to stderr at `warn`, or at whatever `RUST_LOG` asks for.
fn start_logger() -> Option<LoggerHandle> {
    match Logger::try_with_env_or_str("warn").and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: logging disabled: {}", e);
            None
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let _logger = start_logger();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
