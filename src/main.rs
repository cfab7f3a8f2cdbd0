use clap::Parser;
use tally::cli::commands::Cli;
use tally::cli::handlers;
use tally::io::store;
use tally::logging;

fn main() {
    let cli = Cli::parse();

    let data_dir = match store::resolve_data_dir(cli.data_dir.clone()) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    // logging is best-effort; an unwritable data dir must not block commands
    let _logger = match logging::init_logging(&data_dir) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: logging disabled: {}", e);
            None
        }
    };

    if let Err(e) = handlers::dispatch(cli, &data_dir) {
        log::error!("command failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
