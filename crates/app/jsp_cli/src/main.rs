// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::Cli;
use jsp_core::http::SESSION_EXPIRED_MESSAGE;

mod cli;
mod commands;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        if e.is_unauthorized() {
            log::error!("{}", SESSION_EXPIRED_MESSAGE);
        } else {
            log::error!("{}", e);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    // A missing .env is fine; the real environment still applies.
    let _ = dotenvy::dotenv();
    logging::init()?;

    let args = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::execute(&args))
}
