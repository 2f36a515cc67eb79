//! Material Viewer Core Data Structures
//!
//! This crate contains the GPU-free records the viewer binds together:
//! - Matl: ordered material records with typed attributes
//! - ParamId: closed set of material parameter identifiers
//! - State enums: raw sampler, rasterizer and blend values as stored in assets
//! - Modl: binding entries from mesh regions to material labels
//! - Serialization of the records (RON)

pub mod matl;
pub mod modl;
pub mod param;
pub mod serialize;
pub mod state;

pub use matl::*;
pub use modl::*;
pub use param::*;
pub use serialize::*;
pub use state::*;
