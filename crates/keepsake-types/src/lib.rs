//! Foundation types for keepsake.
//!
//! This crate provides the identity and temporal types shared by the codec
//! and the persistence engines. Every other keepsake crate depends on
//! `keepsake-types`.
//!
//! # Key Types
//!
//! - [`RecordId`] -- Primary key of a persisted record (random UUID by default)
//! - [`Timestamp`] -- UTC instant with millisecond precision and a fixed text form

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::TypeError;
pub use identity::RecordId;
pub use temporal::{Timestamp, TIMESTAMP_FORMAT};
