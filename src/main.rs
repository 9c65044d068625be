use clap::Parser;
use daylist::cli::commands::Cli;
use daylist::cli::handlers;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        log::error!("event=exit status=error error={}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
