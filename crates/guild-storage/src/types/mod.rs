//! Type definitions for guild storage.

mod applications;
mod ids;
mod indications;
mod invitations;
mod members;

// Re-export all types from submodules
pub use applications::*;
pub use ids::*;
pub use indications::*;
pub use invitations::*;
pub use members::*;
