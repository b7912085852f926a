//! Versionable object codec for keepsake.
//!
//! Application types implement [`Storable`] to map themselves to and from a
//! schema-less [`Document`]. Documents record the type name that produced
//! them (the *discriminator*) and render to canonical JSON text for storage.
//!
//! # Reconstruction
//!
//! [`Codec::restore`] turns a document back into a typed value:
//!
//! 1. Read the discriminator recorded at write time.
//! 2. Resolve it through the [`LegacyResolver`] to the current type name,
//!    following renames to a fixed point. A rename cycle is an error.
//! 3. Look up the factory for that name in the [`TypeRegistry`].
//! 4. Run the factory against the *original* document, so field-level
//!    legacy keys still see the data as it was written.
//!
//! # Failure Policy
//!
//! - Root and required nested objects: any failure is an error.
//! - Optional nested objects: failure yields `None`.
//! - Nested arrays: unreadable elements are dropped, the rest are kept.

pub mod codec;
pub mod document;
pub mod error;
pub mod legacy;
pub mod reader;
pub mod registry;
pub mod storable;
pub mod value;

#[cfg(test)]
pub(crate) mod fixtures;

pub use codec::Codec;
pub use document::{Document, TYPE_KEY};
pub use error::{CodecError, CodecResult};
pub use legacy::LegacyResolver;
pub use reader::DocumentReader;
pub use registry::{Factory, TypeRegistry};
pub use storable::Storable;
pub use value::{FromValue, Value};
