use clap::Parser;
use tracing::debug;

use tax_cli::app::{self, Cli, Settings};
use tax_cli::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;

    logging::init_logging(settings.log_level.as_deref(), settings.log_file.as_deref())?;
    debug!(?settings, "resolved settings");

    let output = app::run(&cli, &settings)?;
    print!("{output}");

    Ok(())
}
