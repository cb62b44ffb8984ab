//! mock-pay binary entry point.

use std::process::ExitCode;

use mock_pay::{api, cli, config::Config, logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Run 'mock-pay --help' for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::try_init_with_level(config.log_filter()) {
        eprintln!("warning: logging already initialized: {e}");
    }

    info!("mock-pay v{}", env!("CARGO_PKG_VERSION"));

    let server_config = match config.to_server_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match api::serve(server_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
