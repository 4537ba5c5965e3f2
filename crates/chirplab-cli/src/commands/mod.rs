//! CLI command implementations.

pub mod alias;
pub mod all;
pub mod antialias;
pub mod chirp;
pub mod common;
pub mod config;
pub mod denoise;
pub mod synth;
