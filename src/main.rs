use std::path::PathBuf;

use clap::Parser;
use keydown_bridge::conf::SettingsFlags;

/// Replay a JSON trace of page events through the keydown bridge and print the forwarded keys.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
	/// Trace file: JSON array of `{"ready": true}` and `{"key": "...", "focus": "TAG"}` steps
	trace: PathBuf,
	#[clap(flatten)]
	settings: SettingsFlags,
}

#[cfg(feature = "ssr")]
fn main() -> color_eyre::eyre::Result<()> {
	use keydown_bridge::{
		conf::Settings,
		replay::{self, Trace},
	};
	use tracing::info;
	use tracing_subscriber::EnvFilter;

	color_eyre::install()?;
	let cli = Cli::parse();
	let settings = Settings::try_build(cli.settings)?;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let trace = Trace::load(&cli.trace)?;
	let report = replay::run(&trace, &settings)?;
	for key in &report.forwarded {
		println!("{}", serde_json::to_string(key)?);
	}
	info!(forwarded = report.forwarded.len(), dropped = report.dropped, "replay complete");
	Ok(())
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
	// the browser build is driven through [./web.rs]
	panic!("not the correct access point");
}
