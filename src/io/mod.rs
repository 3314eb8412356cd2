//! Plain-text input loaders and roster renderers.
//!
//! Input files are UTF-8 text, one entry per line:
//!
//! - days: `oct-22`
//! - readings: `first reading`
//! - lectors: `John Doe,oct-22,nov-05` (name, then blocked days)
//!
//! Days and readings are trimmed and lower-cased so that blocked days in
//! the lector list match the day list regardless of case.

mod loader;
mod render;

pub use loader::{
    load_input, parse_days, parse_lectors, parse_readings, read_days, read_lectors,
    read_readings,
};
pub use render::{render_html, render_text, write_html};
