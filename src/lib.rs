//! buildfmt: a canonical formatter for BUILD files.
//!
//! The heavy lifting — parsing with full position and comment fidelity,
//! and hint-driven printing — lives in the `buildfile-cst` crate; this
//! crate is the thin command-line front end.

pub mod cli;
