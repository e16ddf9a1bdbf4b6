//! Leptos hooks over the page-level keydown bridge.
//!
//! Listeners live as long as the reactive owner that called the hook. Outside of any owner they
//! stay registered for the lifetime of the page.

/// Restrict a handler to a single key.
pub fn only_key(wanted: &'static str, handler: impl Fn() + 'static) -> impl Fn(&str) + 'static {
	move |key: &str| {
		if key == wanted {
			handler();
		}
	}
}

/// Register a key handler that fires on document-level key press.
/// Skips events when an input/textarea is focused.
/// The handler receives the key name.
#[cfg(all(feature = "hydrate", not(feature = "ssr")))]
pub fn use_key(handler: impl Fn(&str) + 'static) {
	use leptos::prelude::{Owner, on_cleanup};
	use send_wrapper::SendWrapper;

	let subscription = match crate::web::install(handler) {
		Ok(s) => s,
		Err(e) => {
			tracing::warn!("keyboard hook inactive: {e}");
			return;
		}
	};
	match Owner::current() {
		Some(_) => {
			let subscription = SendWrapper::new(subscription);
			on_cleanup(move || drop(subscription));
		}
		None => subscription.forget(),
	}
}

#[cfg(not(all(feature = "hydrate", not(feature = "ssr"))))]
pub fn use_key(_handler: impl Fn(&str) + 'static) {}

/// Register a handler for the Escape key, subject to the same focus filter as [`use_key`].
pub fn use_escape(handler: impl Fn() + 'static) {
	use_key(only_key("Escape", handler));
}

#[cfg(test)]
mod tests {
	use std::{cell::RefCell, rc::Rc};

	use super::*;
	use crate::{bridge, fake::FakeSource};

	#[test]
	fn only_key_filters_other_keys() {
		let source = FakeSource::ready();
		let hits = Rc::new(RefCell::new(0));
		let _sub = bridge::install(&source, {
			let hits = Rc::clone(&hits);
			only_key("Escape", move || *hits.borrow_mut() += 1)
		})
		.unwrap();

		source.press("Enter", None);
		source.press("Escape", Some("DIV"));
		source.press("Escape", Some("INPUT"));
		source.press("escape", None);
		assert_eq!(*hits.borrow(), 1);
	}
}
