//! Replay a recorded sequence of page events through the bridge on a [`FakeSource`].
//!
//! Trace format, a JSON array of steps:
//! ```json
//! [
//!   { "key": "j", "focus": "DIV" },
//!   { "ready": true },
//!   { "key": "k", "focus": "INPUT" },
//!   { "key": " " }
//! ]
//! ```
//! `focus` is the focused element's tag name; omitted or `null` means the document itself.

use std::{cell::RefCell, path::Path, rc::Rc};

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use tracing::debug;

use crate::{bridge, conf::Settings, fake::FakeSource};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Step {
	Ready {
		ready: bool,
	},
	Key {
		key: String,
		#[serde(default)]
		focus: Option<String>,
	},
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, derive_more::Deref)]
#[serde(transparent)]
pub struct Trace(Vec<Step>);

impl Trace {
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).wrap_err("malformed trace")
	}

	pub fn load(path: &Path) -> Result<Self> {
		let json = std::fs::read_to_string(path).wrap_err_with(|| format!("reading trace {}", path.display()))?;
		Self::from_json(&json).wrap_err_with(|| format!("in {}", path.display()))
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, derive_new::new)]
pub struct Report {
	/// Keys handed to the callback, in order.
	pub forwarded: Vec<String>,
	/// Key steps that were not forwarded: text-input focus, or pressed before readiness.
	pub dropped: usize,
}

pub fn run(trace: &Trace, settings: &Settings) -> Result<Report> {
	let source = if settings.ready_at_start { FakeSource::ready() } else { FakeSource::new() };
	let forwarded = Rc::new(RefCell::new(Vec::new()));
	let subscription = bridge::install(&source, {
		let forwarded = Rc::clone(&forwarded);
		move |key: &str| forwarded.borrow_mut().push(key.to_owned())
	})?;

	let mut presses = 0;
	for step in trace.iter() {
		match step {
			Step::Ready { ready: true } => source.fire_ready().wrap_err("readiness observer failed")?,
			Step::Ready { ready: false } => {}
			Step::Key { key, focus } => {
				presses += 1;
				source.press(key, focus.as_deref());
			}
		}
	}
	debug!(phase = %subscription.phase(), presses, "replay finished");
	drop(subscription);

	let forwarded = forwarded.take();
	let dropped = presses - forwarded.len();
	Ok(Report::new(forwarded, dropped))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_both_step_shapes() {
		let trace = Trace::from_json(r#"[{"ready": true}, {"key": "a", "focus": "INPUT"}, {"key": " "}, {"key": "b", "focus": null}]"#).unwrap();
		assert_eq!(
			*trace,
			vec![
				Step::Ready { ready: true },
				Step::Key {
					key: "a".into(),
					focus: Some("INPUT".into())
				},
				Step::Key { key: " ".into(), focus: None },
				Step::Key { key: "b".into(), focus: None },
			]
		);
	}

	#[test]
	fn rejects_unknown_steps() {
		assert!(Trace::from_json(r#"[{"mouse": 1}]"#).is_err());
		assert!(Trace::from_json(r#"{"key": "a"}"#).is_err());
	}

	#[test]
	fn keys_before_ready_are_dropped() {
		let trace = Trace::from_json(r#"[{"key": "a"}, {"ready": true}, {"key": "j", "focus": "DIV"}, {"key": "k", "focus": "INPUT"}, {"key": "l", "focus": "DIV"}]"#).unwrap();
		let report = run(&trace, &Settings::default()).unwrap();
		assert_eq!(report, Report::new(vec!["j".into(), "l".into()], 2));
	}

	#[test]
	fn ready_at_start_forwards_immediately() {
		let trace = Trace::from_json(r#"[{"key": "a"}, {"key": "Enter", "focus": "TEXTAREA"}, {"ready": false}]"#).unwrap();
		let settings = Settings {
			ready_at_start: true,
			..Default::default()
		};
		let report = run(&trace, &settings).unwrap();
		assert_eq!(report, Report::new(vec!["a".into()], 1));
	}
}
