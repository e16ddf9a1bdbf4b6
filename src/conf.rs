use std::path::PathBuf;

use color_eyre::eyre::{Result, WrapErr};

/// Settings for the replay tool. Built from defaults, then an optional JSON file, then CLI flags.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Treat the document as loaded before the first trace step.
	pub ready_at_start: bool,
	/// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
	pub log_filter: String,
}

fn __default_log_filter() -> String {
	"info".to_string()
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			ready_at_start: false,
			log_filter: __default_log_filter(),
		}
	}
}

#[derive(Clone, Debug, Default, clap::Args)]
pub struct SettingsFlags {
	/// Path to a JSON settings file
	#[arg(long)]
	pub config: Option<PathBuf>,
	/// Start the replay with the document already loaded
	#[arg(long)]
	pub ready_at_start: bool,
	/// Log filter directive (e.g. `keydown_bridge=trace`)
	#[arg(long)]
	pub log_filter: Option<String>,
}

impl Settings {
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).wrap_err("invalid settings")
	}

	pub fn try_build(flags: SettingsFlags) -> Result<Self> {
		let mut settings = match &flags.config {
			Some(path) => {
				let json = std::fs::read_to_string(path).wrap_err_with(|| format!("reading settings from {}", path.display()))?;
				Self::from_json(&json).wrap_err_with(|| format!("in {}", path.display()))?
			}
			None => Self::default(),
		};
		if flags.ready_at_start {
			settings.ready_at_start = true;
		}
		if let Some(filter) = flags.log_filter {
			settings.log_filter = filter;
		}
		Ok(settings)
	}
}
