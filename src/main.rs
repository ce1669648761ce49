use clap::Parser;
use crossmom::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
