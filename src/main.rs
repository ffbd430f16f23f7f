use sqlite_access::{
    config::{self, Config},
    core::db::format_row,
    demo, logging, DatabaseAccessor,
};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

/// Usage: `sqlite-access [DATABASE | CONFIG.toml]`
///
/// A `.toml` argument is read as configuration; any other argument names the
/// database file. Without arguments the demo runs against `data.db`.
fn main() -> ExitCode {
    let config = match load(std::env::args().nth(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting sqlite-access demo on {}", config.database.path.display());

    let mut db = DatabaseAccessor::from_config(&config.database);
    match demo::run(&mut db) {
        Ok(report) => {
            for (label, cursor) in report.sections() {
                println!("-- {}", label);
                for row in cursor {
                    println!("{}", format_row(row));
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("demo aborted: {}", e);
            eprintln!("Demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load(arg: Option<String>) -> sqlite_access::Result<Config> {
    match arg {
        Some(arg) if Path::new(&arg).extension().is_some_and(|ext| ext == "toml") => {
            config::load_config(&arg)
        }
        Some(path) => {
            let mut config = Config::default();
            config.database.path = path.into();
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}
