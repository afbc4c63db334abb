use clap::Parser;
use console::style;

use gocd_tasks::cli::Cli;

fn main() {
    let cli = Cli::parse();
    gocd_tasks::init_logging(cli.verbose);

    if let Err(err) = gocd_tasks::run(cli) {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}
