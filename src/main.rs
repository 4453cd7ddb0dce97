use clap::Parser;
use sportstock::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
