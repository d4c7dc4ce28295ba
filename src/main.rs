use clap::Parser;
use color_eyre::Result;
use tracing::info;

use timetrack::api::HttpTransport;
use timetrack::cache::Store;
use timetrack::cli::{self, Cli};
use timetrack::config::Config;
use timetrack::logging;
use timetrack::notify::Notifier;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Cli::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  let _log_guard = logging::init()?;
  info!(page_size = config.page_size, "starting");

  let transport = HttpTransport::new(&config)?;
  let store = Store::new(transport, Notifier::new()).with_page_size(config.page_size);

  cli::run(&store, args.command).await
}
