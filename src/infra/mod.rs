//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the local control-plane
//! adapter, deployment record persistence, and embedded asset access.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod assets;
pub mod provider;
pub mod state;
