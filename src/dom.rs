//! DOM rules the browser host relies on, kept free of JS types.

use std::{cell::RefCell, rc::Rc};

/// `document.readyState` before `DOMContentLoaded`. The other states are `"interactive"` and `"complete"`.
pub fn is_loading(ready_state: &str) -> bool {
	ready_state == "loading"
}

/// Error raised by a callback during the current dispatch, handed back to the listener once the
/// bridge returns. Only the first error of a dispatch is kept.
#[derive(Debug)]
pub struct Pending<E>(Rc<RefCell<Option<E>>>);

impl<E> Default for Pending<E> {
	fn default() -> Self {
		Self(Rc::default())
	}
}

impl<E> Clone for Pending<E> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<E> Pending<E> {
	pub fn raise(&self, err: E) {
		self.0.borrow_mut().get_or_insert(err);
	}

	/// `Err` with the raised error, clearing it, or `Ok` if nothing was raised.
	pub fn settle(&self) -> Result<(), E> {
		match self.0.borrow_mut().take() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}
