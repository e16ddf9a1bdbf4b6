//! Key events as the bridge sees them.
//!
//! A host turns whatever it dispatches into a [`KeyEvent`]: the key name plus a coarse
//! classification of the element holding focus at dispatch time.

/// Classification of the focused element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, derive_more::Display)]
pub enum FocusKind {
	/// `<input>` or `<textarea>`: typed characters belong to the control.
	#[display("text-input")]
	TextInput,
	#[default]
	#[display("other")]
	Other,
}

impl FocusKind {
	/// Classify by tag name. Case-insensitive, since HTML reports tags uppercased and XHTML does not.
	pub fn from_tag_name(tag: &str) -> Self {
		if tag.eq_ignore_ascii_case("INPUT") || tag.eq_ignore_ascii_case("TEXTAREA") {
			Self::TextInput
		} else {
			Self::Other
		}
	}

	/// `None` is a target that is not an element at all (the document itself).
	pub fn from_target(tag: Option<&str>) -> Self {
		tag.map(Self::from_tag_name).unwrap_or_default()
	}

	pub fn is_text_input(self) -> bool {
		self == Self::TextInput
	}
}

/// One key press, borrowed from the host for the duration of a single dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_new::new)]
pub struct KeyEvent<'a> {
	/// Key identifier as reported by the host: `"Enter"`, `"a"`, `"ArrowUp"`, `" "`.
	pub key: &'a str,
	pub focus: FocusKind,
}
