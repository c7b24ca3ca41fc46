// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

use healify::cli::args::{Cli, Commands};
use healify::cli::logging::set_verbose;
use healify::cli::predict::{run_labels, run_prediction};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Predict(args) => {
            set_verbose(args.verbose);
            run_prediction(args).await;
        }
        Commands::Labels(args) => run_labels(args),
    }
}
