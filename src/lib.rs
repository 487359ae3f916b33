//! World bubble map of brand traffic per country, rendered with braille
//! characters in the terminal.

pub mod aggregate;
pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod filter;
pub mod format;
pub mod interaction;
pub mod legend;
pub mod map;
pub mod ui;
