//! In-memory [`EventSource`] with a hand-driven readiness signal and key presses.
//!
//! Dispatch follows DOM rules closely enough for the bridge: listeners run in registration order,
//! a listener removed mid-dispatch is not called, and one added mid-dispatch waits for the next
//! event. A `press` made from inside a listener is dispatched synchronously, but skips the
//! listeners still running further up the stack: a Rust `FnMut` cannot be re-entered.

use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};

use color_eyre::eyre::Result;

use crate::{
	bridge::{EventSource, KeyListener, ReadyObserver},
	keyboard::{FocusKind, KeyEvent},
};

#[derive(Clone, Default)]
pub struct FakeSource {
	state: Rc<RefCell<State>>,
}

#[derive(Default)]
struct State {
	ready: bool,
	next_id: u64,
	observers: Vec<(u64, ReadyObserver)>,
	listeners: Vec<(u64, Rc<RefCell<KeyListener>>)>,
}

impl State {
	fn next_id(&mut self) -> u64 {
		self.next_id += 1;
		self.next_id
	}

	fn has_listener(&self, id: u64) -> bool {
		self.listeners.iter().any(|(i, _)| *i == id)
	}
}

impl FakeSource {
	/// Still loading.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loading already finished.
	pub fn ready() -> Self {
		let source = Self::default();
		source.state.borrow_mut().ready = true;
		source
	}

	/// Pass the readiness milestone, firing every pending observer once in registration order.
	/// Later calls do nothing. Returns the first error an observer produced; the rest still run.
	pub fn fire_ready(&self) -> Result<()> {
		let observers = {
			let mut state = self.state.borrow_mut();
			state.ready = true;
			std::mem::take(&mut state.observers)
		};
		let mut first_err = None;
		for (_, observer) in observers {
			if let Err(e) = observer() {
				first_err.get_or_insert(e);
			}
		}
		match first_err {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}

	/// Dispatch one key press. `focus_tag` is the tag name of the focused element, `None` when focus is on the document.
	pub fn press(&self, key: &str, focus_tag: Option<&str>) {
		let focus = FocusKind::from_target(focus_tag);
		let snapshot: Vec<_> = self.state.borrow().listeners.iter().map(|(id, l)| (*id, Rc::clone(l))).collect();
		for (id, listener) in snapshot {
			if !self.state.borrow().has_listener(id) {
				continue;
			}
			let Ok(mut running) = listener.try_borrow_mut() else {
				continue;
			};
			(&mut *running)(KeyEvent::new(key, focus));
		}
	}

	pub fn is_ready(&self) -> bool {
		self.state.borrow().ready
	}

	pub fn listener_count(&self) -> usize {
		self.state.borrow().listeners.len()
	}

	pub fn pending_observer_count(&self) -> usize {
		self.state.borrow().observers.len()
	}
}

/// Removes its listener or observer on drop.
pub struct FakeRegistration {
	id: u64,
	state: Weak<RefCell<State>>,
}

impl Drop for FakeRegistration {
	fn drop(&mut self) {
		let Some(state) = self.state.upgrade() else {
			return;
		};
		let mut state = state.borrow_mut();
		state.observers.retain(|(id, _)| *id != self.id);
		state.listeners.retain(|(id, _)| *id != self.id);
	}
}

impl EventSource for FakeSource {
	type Registration = FakeRegistration;

	fn is_ready(&self) -> bool {
		FakeSource::is_ready(self)
	}

	fn on_ready(&self, observer: ReadyObserver) -> Result<FakeRegistration> {
		let mut state = self.state.borrow_mut();
		let id = state.next_id();
		state.observers.push((id, observer));
		Ok(FakeRegistration {
			id,
			state: Rc::downgrade(&self.state),
		})
	}

	fn on_keydown(&self, listener: KeyListener) -> Result<FakeRegistration> {
		let mut state = self.state.borrow_mut();
		let id = state.next_id();
		state.listeners.push((id, Rc::new(RefCell::new(listener))));
		Ok(FakeRegistration {
			id,
			state: Rc::downgrade(&self.state),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fire_ready_runs_observers_once() {
		let source = FakeSource::new();
		let fired = Rc::new(RefCell::new(0));
		let _reg = source
			.on_ready({
				let fired = Rc::clone(&fired);
				Box::new(move || -> Result<()> {
					*fired.borrow_mut() += 1;
					Ok(())
				})
			})
			.unwrap();
		assert!(!source.is_ready());
		source.fire_ready().unwrap();
		source.fire_ready().unwrap();
		assert!(source.is_ready());
		assert_eq!(*fired.borrow(), 1);
		assert_eq!(source.pending_observer_count(), 0);
	}

	#[test]
	fn observer_error_is_returned_and_others_still_run() {
		let source = FakeSource::new();
		let ran = Rc::new(RefCell::new(false));
		let _a = source.on_ready(Box::new(|| -> Result<()> { Err(color_eyre::eyre::eyre!("boom")) })).unwrap();
		let _b = source
			.on_ready({
				let ran = Rc::clone(&ran);
				Box::new(move || -> Result<()> {
					*ran.borrow_mut() = true;
					Ok(())
				})
			})
			.unwrap();
		let err = source.fire_ready().unwrap_err();
		assert_eq!(err.to_string(), "boom");
		assert!(*ran.borrow());
	}

	#[test]
	fn dropping_registration_removes_listener() {
		let source = FakeSource::ready();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let reg = source
			.on_keydown({
				let seen = Rc::clone(&seen);
				Box::new(move |event: KeyEvent<'_>| seen.borrow_mut().push((event.key.to_owned(), event.focus)))
			})
			.unwrap();
		source.press("x", Some("INPUT"));
		assert_eq!(source.listener_count(), 1);
		drop(reg);
		assert_eq!(source.listener_count(), 0);
		source.press("y", None);
		assert_eq!(*seen.borrow(), vec![("x".to_owned(), FocusKind::TextInput)]);
	}

	#[test]
	fn nested_press_skips_running_listener() {
		let source = FakeSource::ready();
		let outer = Rc::new(RefCell::new(Vec::new()));
		let other = Rc::new(RefCell::new(Vec::new()));
		let _outer = source
			.on_keydown({
				let outer = Rc::clone(&outer);
				let source = source.clone();
				Box::new(move |event: KeyEvent<'_>| {
					outer.borrow_mut().push(event.key.to_owned());
					if event.key == "g" {
						source.press("inner", None);
					}
				})
			})
			.unwrap();
		let _other = source
			.on_keydown({
				let other = Rc::clone(&other);
				Box::new(move |event: KeyEvent<'_>| other.borrow_mut().push(event.key.to_owned()))
			})
			.unwrap();

		source.press("g", None);
		source.press("h", None);
		assert_eq!(*outer.borrow(), vec!["g", "h"]);
		assert_eq!(*other.borrow(), vec!["inner", "g", "h"]);
	}

	#[test]
	fn dropped_observer_never_fires() {
		let source = FakeSource::new();
		let reg = source.on_ready(Box::new(|| -> Result<()> { panic!("should not fire") })).unwrap();
		drop(reg);
		source.fire_ready().unwrap();
	}
}
