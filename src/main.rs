use clap::Parser;
use snafu::ErrorCompat;

mod args;
mod tracker;

fn main() {
    let parsed = args::Args::parse();
    if parsed.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }

    if let Err(e) = tracker::run(&parsed) {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
