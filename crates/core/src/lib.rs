//! Popup Relay Core - Shared domain types.
//!
//! This crate provides the types shared by the relay service and its tests:
//! - [`Email`] and [`Phone`] - contact details validated at the HTTP boundary
//! - [`Tag`] and [`TagSet`] - customer tag handling for the directory service
//! - [`CustomerId`] - the directory's numeric customer identifier
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! here is pure and cheap to unit test.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
