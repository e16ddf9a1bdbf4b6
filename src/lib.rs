//! Forward page-level key presses to a callback, except those typed into text-entry controls.
//!
//! ```
//! use keydown_bridge::{bridge, fake::FakeSource};
//!
//! let source = FakeSource::new();
//! let sub = bridge::install(&source, |key: &str| println!("{key}")).unwrap();
//! source.fire_ready().unwrap();
//! source.press("ArrowDown", Some("BUTTON"));
//! assert!(sub.is_listening());
//! ```
pub mod bridge;
pub mod conf;
pub mod dom;
pub mod fake;
pub mod hooks;
pub mod keyboard;
pub mod replay;
#[cfg(feature = "hydrate")]
pub mod web;

pub use bridge::{EventSource, Phase, Subscription, install};
pub use keyboard::{FocusKind, KeyEvent};
