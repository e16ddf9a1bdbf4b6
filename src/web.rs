//! Browser host: the page's `document` as an [`EventSource`].

use color_eyre::eyre::{Report, Result, eyre};
use wasm_bindgen::{JsCast, JsValue, closure::Closure, prelude::wasm_bindgen};
use web_sys::{AddEventListenerOptions, Document, Element, Event, EventTarget, KeyboardEvent};

use crate::{
	bridge::{self, EventSource, KeyListener, ReadyObserver, Subscription},
	dom::{self, Pending},
	keyboard::{FocusKind, KeyEvent},
};

type Listener = Closure<dyn FnMut(Event) -> Result<(), JsValue>>;

#[derive(Clone)]
pub struct WebSource {
	document: Document,
	/// Error raised by a callback during the current dispatch; rethrown by the listener once the bridge returns.
	pending: Pending<JsValue>,
}

impl WebSource {
	pub fn new(document: Document) -> Self {
		Self {
			document,
			pending: Pending::default(),
		}
	}

	pub fn from_window() -> Result<Self> {
		let window = web_sys::window().ok_or_else(|| eyre!("no global `window`: not running in a browser"))?;
		let document = window.document().ok_or_else(|| eyre!("`window` has no `document`"))?;
		Ok(Self::new(document))
	}

	/// Have the keydown listener currently running throw `err` to the browser once it finishes.
	pub fn raise(&self, err: JsValue) {
		self.pending.raise(err);
	}

	fn listen(&self, kind: &'static str, closure: Listener, once: bool) -> Result<WebRegistration> {
		let target: EventTarget = self.document.clone().into();
		let options = AddEventListenerOptions::new();
		options.set_once(once);
		target
			.add_event_listener_with_callback_and_add_event_listener_options(kind, closure.as_ref().unchecked_ref(), &options)
			.map_err(|e| eyre!("failed to register `{kind}` listener: {e:?}"))?;
		Ok(WebRegistration { target, kind, closure })
	}
}

/// Owns the JS closure; unregisters it on drop.
pub struct WebRegistration {
	target: EventTarget,
	kind: &'static str,
	closure: Listener,
}

impl Drop for WebRegistration {
	fn drop(&mut self) {
		let _ = self.target.remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
	}
}

/// Tag of the event target; a target that is not an `Element` (the document) is `Other`.
fn focus_of(event: &Event) -> FocusKind {
	let tag = event.target().and_then(|t| t.dyn_into::<Element>().ok()).map(|el| el.tag_name());
	FocusKind::from_target(tag.as_deref())
}

fn to_js(err: Report) -> JsValue {
	js_sys::Error::new(&format!("{err:#}")).into()
}

impl EventSource for WebSource {
	type Registration = WebRegistration;

	fn is_ready(&self) -> bool {
		!dom::is_loading(&self.document.ready_state())
	}

	fn on_ready(&self, observer: ReadyObserver) -> Result<WebRegistration> {
		let mut observer = Some(observer);
		let closure = Listener::new(move |_: Event| match observer.take() {
			Some(observer) => observer().map_err(to_js),
			None => Ok(()),
		});
		self.listen("DOMContentLoaded", closure, true)
	}

	fn on_keydown(&self, mut listener: KeyListener) -> Result<WebRegistration> {
		let pending = self.pending.clone();
		let closure = Listener::new(move |event: Event| {
			if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
				let key = keyboard.key();
				listener(KeyEvent::new(&key, focus_of(&event)));
			}
			pending.settle()
		});
		self.listen("keydown", closure, false)
	}
}

/// Install on the current page's `document`.
pub fn install<F>(callback: F) -> Result<Subscription<WebSource>>
where
	F: FnMut(&str) + 'static, {
	console_error_panic_hook::set_once();
	let source = WebSource::from_window()?;
	bridge::install(&source, callback)
}

/// JS entry point: forward qualifying key names to `callback` for the lifetime of the page.
///
/// Whatever `callback` throws is rethrown from the keydown listener, so it reaches the page's
/// usual error reporting and later key presses are unaffected.
#[wasm_bindgen(js_name = catch_keydown_message)]
pub fn catch_keydown(callback: js_sys::Function) -> Result<(), JsValue> {
	console_error_panic_hook::set_once();
	let source = WebSource::from_window().map_err(to_js)?;
	let raiser = source.clone();
	let subscription = bridge::install(&source, move |key: &str| {
		if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(key)) {
			raiser.raise(err);
		}
	})
	.map_err(to_js)?;
	subscription.forget();
	Ok(())
}
