use clap::Parser;

use calma::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = calma::run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
