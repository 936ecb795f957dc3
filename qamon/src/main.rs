//! QA monitor entry point

use clap::Parser;
use qamon::cli::serve::ServeArgs;
use qamon::cli::{Cli, Commands};
use qamon::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {:#}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Some(Commands::RunOnce) => match qamon::cli::run_once::execute().await {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                2
            }
        },
        Some(Commands::Serve(args)) => serve(args).await,
        None => serve(ServeArgs::default()).await,
    };

    // flush buffered file logs before exiting
    drop(log_guard);
    std::process::exit(code);
}

async fn serve(args: ServeArgs) -> i32 {
    match qamon::cli::serve::execute(&args).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
