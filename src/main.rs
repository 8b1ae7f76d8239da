mod cli;

use clap::Parser;

use cli::report::ReportOptions;
use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => cli::report::run(None, None, ReportOptions::default()),
        Some(Commands::Init { data_dir }) => cli::init::run(data_dir),
        Some(Commands::Report {
            month,
            file,
            daily,
            transactions,
            show_skipped,
        }) => cli::report::run(
            month,
            file,
            ReportOptions {
                daily,
                transactions,
                show_skipped,
            },
        ),
        Some(Commands::Export {
            month,
            file,
            output,
        }) => cli::export::run(month, file, output),
        Some(Commands::Sync { month, file, force }) => cli::sync::run(month, file, force),
        Some(Commands::Summary { month }) => cli::sync::summary(month),
        Some(Commands::Rules) => cli::rules::list(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
