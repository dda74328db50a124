//! # edgehook-pack
//!
//! Build-time composition for EdgeHook. Joins a hook-installation fragment
//! and a payload fragment into one self-invoking script whose install
//! segment is skipped when a previous installation already set the guard.

pub mod compose;
pub mod error;
pub mod pipeline;

pub use compose::{ComposedArtifact, HOOKED_GUARD, compose};
pub use error::{ComposeError, InputRole};
pub use pipeline::{PackReport, pack_files};
