use anyhow::Result;
use clap::Parser;

use orderme::app::AppContext;
use orderme::cli::{self, Cli};
use orderme::config::Config;
use orderme::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = cli.api_url {
        config.apply_api_url(url);
        config.validate()?;
    }

    let app = AppContext::new(config)?;
    let mut stdout = std::io::stdout();
    let result = cli::run(cli.command, &app, &mut stdout).await;
    app.shutdown();
    result
}
