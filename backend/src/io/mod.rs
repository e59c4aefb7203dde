//! # IO Module
//!
//! Interface layer exposing the domain to the outside world. Currently a
//! single REST surface consumed by the browser UI.

pub mod rest;

pub use rest::*;
