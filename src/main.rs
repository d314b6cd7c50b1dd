use std::process::ExitCode;

use colored::Colorize;
use linkpress::config::{Args, StaticConfig, get_config, init_config_from};
use linkpress::errors::LinkpressError;
use linkpress::runtime::modes::run_server;
use linkpress::system::init_logging;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse_from_env();

    if let Some(path) = args.generate_config.as_deref() {
        return match StaticConfig::default().save_to_file(path) {
            Ok(()) => {
                println!("{} {}", "Sample configuration written to".green(), path);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{} {}", "Failed to write sample configuration:".red().bold(), e);
                ExitCode::FAILURE
            }
        };
    }

    init_config_from(&args.config);
    let config = get_config();

    // guard 必须活到进程结束，否则缓冲中的日志会丢失
    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_server().await {
        match e.downcast_ref::<LinkpressError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("{} {:#}", "Error:".red().bold(), e),
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
