//! Terminal front-end: argument parsing, styles and list rendering.

pub mod render;
pub mod setup;
pub mod styles;
