//! Presentation state for the rewrites page: the list store, the table model,
//! the dialogs and the controller that ties them to a [`RewriteBackend`].
//!
//! [`RewriteBackend`]: crate::common::RewriteBackend

pub mod controls;
mod controller;
mod modal;
mod preferences;
mod store;
mod table;

pub use controller::*;
pub use modal::*;
pub use preferences::*;
pub use store::*;
pub use table::*;
