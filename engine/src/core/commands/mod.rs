//! Edit Command System
//!
//! Defines the Command system, the core of undo/redo.
//! All editing operations are performed through Commands in this module.

mod group;
mod style;
mod subtitle;
mod system;
mod traits;

pub use group::*;
pub use style::*;
pub use subtitle::*;
pub use system::*;
pub use traits::*;
