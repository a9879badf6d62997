//! Time Values
//!
//! Millisecond time values and framerate helpers shared by the model,
//! the commands and the format plugins.

mod framerate;
mod subtitle_time;

pub use framerate::*;
pub use subtitle_time::*;
