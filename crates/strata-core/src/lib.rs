//! # Strata Core - Foundation
//!
//! **Purpose**: Shared vocabulary of the bootstrap workspace.
//!
//! - Unified error type ([`StrataError`])
//! - Declarative configuration model and its validation ([`config`])
//! - Naming template engine ([`naming`])
//! - Roles, resource kinds and scope contexts ([`scope`])
//!
//! Everything in this crate is pure and synchronous; nothing here talks to the
//! remote platform.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Declarative bootstrap configuration
pub mod config;

/// Unified error handling
pub mod errors;

/// Naming template engine
pub mod naming;

/// Roles, resource kinds and scope contexts
pub mod scope;

pub use config::{
    BootstrapConfig, DeleteOrDeprecate, Features, IdpMapping, NameLimits, Namespace,
    NamespaceNode, SharedAccess, SharedNode,
};
pub use errors::{Result, StrataError};
pub use naming::{sanitize_space_id, GroupLevel, NamingScheme};
pub use scope::{RoleType, ScopeBuckets, ScopeContext, ScopeCtxType};
