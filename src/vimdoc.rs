//! Main module for help-file conversion

pub mod config;
pub mod converting;
pub mod diagnostics;
pub mod error;
pub mod escaping;
pub mod inlines;
pub mod patterns;
pub mod tags;
