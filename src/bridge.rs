//! The keydown bridge: wait for the host to be ready, then forward every key press that does not
//! land in a text-entry control.
//!
//! Hosts plug in through [`EventSource`]. [`install`] returns a [`Subscription`] that owns every
//! listener it registered; dropping it unregisters them, [`Subscription::forget`] keeps them for
//! the rest of the process.

use std::{
	cell::{Cell, RefCell},
	fmt,
	rc::Rc,
};

use color_eyre::eyre::Result;
use tracing::{debug, trace};

use crate::keyboard::KeyEvent;

/// Fired once when the host finishes loading the document.
pub type ReadyObserver = Box<dyn FnOnce() -> Result<()>>;
/// Called for every key press the host dispatches.
pub type KeyListener = Box<dyn FnMut(KeyEvent<'_>)>;

/// Where key presses and the readiness signal come from.
pub trait EventSource: Clone + 'static {
	/// One registered listener. Dropping it must unregister the listener.
	type Registration: 'static;

	/// Whether the readiness milestone has already passed.
	fn is_ready(&self) -> bool;
	/// Register a one-shot readiness observer. Errors it returns go to the host.
	fn on_ready(&self, observer: ReadyObserver) -> Result<Self::Registration>;
	/// Register a persistent keydown listener.
	fn on_keydown(&self, listener: KeyListener) -> Result<Self::Registration>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, derive_more::Display)]
pub enum Phase {
	#[default]
	#[display("awaiting-ready")]
	AwaitingReady,
	#[display("listening")]
	Listening,
}

/// Shared view of a bridge's phase. The only transition is [`Lifecycle::activate`].
#[derive(Clone, Debug, Default)]
pub(crate) struct Lifecycle(Rc<Cell<Phase>>);

impl Lifecycle {
	pub(crate) fn phase(&self) -> Phase {
		self.0.get()
	}

	/// `AwaitingReady -> Listening`. Irreversible; returns whether this call made the transition.
	pub(crate) fn activate(&self) -> bool {
		if self.0.replace(Phase::Listening) == Phase::Listening {
			return false;
		}
		debug!("keydown bridge listening");
		true
	}
}

/// What the bridge did with a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
	Forwarded,
	/// Focus was in a text-entry control.
	Suppressed,
	/// Arrived before readiness.
	NotReady,
}

/// Callback plus lifecycle. Hosts never see this directly; [`install`] wires it up.
pub(crate) struct Bridge<F> {
	lifecycle: Lifecycle,
	callback: F,
}

impl<F: FnMut(&str)> Bridge<F> {
	pub(crate) fn new(callback: F) -> Self {
		Self {
			lifecycle: Lifecycle::default(),
			callback,
		}
	}

	pub(crate) fn lifecycle(&self) -> &Lifecycle {
		&self.lifecycle
	}

	pub(crate) fn handle(&mut self, event: KeyEvent<'_>) -> Outcome {
		if self.lifecycle.phase() != Phase::Listening {
			return Outcome::NotReady;
		}
		if event.focus.is_text_input() {
			return Outcome::Suppressed;
		}
		(self.callback)(event.key);
		Outcome::Forwarded
	}
}

/// Listeners registered by one [`install`] call.
pub struct Subscription<S: EventSource> {
	lifecycle: Lifecycle,
	ready: Option<S::Registration>,
	keydown: Rc<RefCell<Option<S::Registration>>>,
}

impl<S: EventSource> Subscription<S> {
	pub fn phase(&self) -> Phase {
		self.lifecycle.phase()
	}

	pub fn is_listening(&self) -> bool {
		self.phase() == Phase::Listening
	}

	/// Keep the listeners registered for the rest of the process.
	pub fn forget(self) {
		std::mem::forget(self);
	}
}

impl<S: EventSource> fmt::Debug for Subscription<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("phase", &self.phase())
			.field("awaiting_ready_observer", &self.ready.is_some())
			.field("keydown_registered", &self.keydown.borrow().is_some())
			.finish()
	}
}

/// Forward every qualifying key press from `source` to `callback`, starting once `source` is ready.
///
/// If the source is already ready the keydown listener is registered before this returns.
/// Every call registers its own listener; nothing is deduplicated.
pub fn install<S, F>(source: &S, callback: F) -> Result<Subscription<S>>
where
	S: EventSource,
	F: FnMut(&str) + 'static, {
	let mut bridge = Bridge::new(callback);
	let lifecycle = bridge.lifecycle().clone();
	let keydown = Rc::new(RefCell::new(None));

	let activate = {
		let source = source.clone();
		let lifecycle = lifecycle.clone();
		let keydown = Rc::clone(&keydown);
		move || -> Result<()> {
			let registration = source.on_keydown(Box::new(move |event: KeyEvent<'_>| {
				let outcome = bridge.handle(event);
				trace!(key = event.key, focus = %event.focus, ?outcome, "keydown");
			}))?;
			*keydown.borrow_mut() = Some(registration);
			lifecycle.activate();
			Ok(())
		}
	};

	let ready = if source.is_ready() {
		debug!("source already ready; attaching keydown listener now");
		activate()?;
		None
	} else {
		debug!("awaiting readiness before attaching keydown listener");
		Some(source.on_ready(Box::new(activate))?)
	};

	Ok(Subscription { lifecycle, ready, keydown })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::keyboard::FocusKind;

	#[test]
	fn bridge_ignores_events_until_activated() {
		let mut seen = Vec::new();
		let mut bridge = Bridge::new(|key: &str| seen.push(key.to_owned()));
		assert_eq!(bridge.lifecycle().phase(), Phase::AwaitingReady);
		assert_eq!(bridge.handle(KeyEvent::new("a", FocusKind::Other)), Outcome::NotReady);

		assert!(bridge.lifecycle().activate());
		assert!(!bridge.lifecycle().activate());
		assert_eq!(bridge.lifecycle().phase(), Phase::Listening);

		assert_eq!(bridge.handle(KeyEvent::new("b", FocusKind::Other)), Outcome::Forwarded);
		assert_eq!(bridge.handle(KeyEvent::new("c", FocusKind::TextInput)), Outcome::Suppressed);
		drop(bridge);
		assert_eq!(seen, vec!["b".to_owned()]);
	}

	#[test]
	fn lifecycle_clones_share_phase() {
		let lifecycle = Lifecycle::default();
		let other = lifecycle.clone();
		other.activate();
		assert_eq!(lifecycle.phase(), Phase::Listening);
		assert_eq!(lifecycle.phase().to_string(), "listening");
	}
}
