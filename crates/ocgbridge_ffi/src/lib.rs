//! # OCGBRIDGE FFI
//!
//! The C side of the adapter: `#[repr(C)]` mirrors of the ocgcore v10
//! structs, the four hook trampolines, and (with `link-ocgcore`) the
//! native engine binding.
//!
//! ## Ownership
//!
//! ```text
//! NativeDuel
//!   ├── OCG_Duel           destroyed first
//!   └── Box<HookPayload>   freed after; every payload pointer targets it
//!         └── pending card responses, released on the done signal
//! ```

#![warn(clippy::pedantic)]

pub mod abi;
pub mod trampolines;

#[cfg(feature = "link-ocgcore")]
pub mod native;

pub use abi::{OcgCardData, OcgDuel, OcgDuelOptions, OcgNewCardInfo, OcgPlayer, OcgQueryInfo};
pub use trampolines::{HookPayload, RawScriptSink};

#[cfg(feature = "link-ocgcore")]
pub use native::{NativeDuel, NativeEngine};
