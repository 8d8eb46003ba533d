//! HTTP handlers, one module per resource.

pub mod applications;
pub mod auth;
pub mod dashboard;
pub mod indications;
pub mod invitations;
pub mod members;
