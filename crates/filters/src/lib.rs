//! Dataset filter policies
//!
//! Each supported kind of house-price dataset has a stateless policy that
//! drops implausible rows. Policies are looked up by an explicit
//! [`DatasetKind`] through the [`PolicyRegistry`].

pub mod dates;
pub mod dedup;
pub mod error;
pub mod kind;
pub mod policies;
pub mod policy;
pub mod range;
pub mod registry;

pub use error::{Error, Result};
pub use kind::{DatasetKind, KindAssignments, KindSource};
pub use policy::{FilterContext, FilterPolicy};
pub use range::NumericRange;
pub use registry::{PolicyRegistry, PolicySettings};
