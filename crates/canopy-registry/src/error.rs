//! Registry error types.

use std::error::Error;
use std::fmt;

use crate::handle::TypeHandle;

/// Errors from registering custom container types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The type, or its name within the target namespace, is already taken.
    DuplicateRegistration {
        /// Handle the rejected registration would have had.
        handle: TypeHandle,
        /// Rust type name of the rejected type.
        type_name: &'static str,
    },
    /// Aux data does not have the shape the registration's display hint
    /// requires.
    MalformedAux {
        /// Handle of the registration that rejected the data.
        handle: TypeHandle,
        /// What is wrong with it.
        detail: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRegistration { handle, type_name } => match handle.namespace() {
                Some(ns) => write!(
                    f,
                    "type {type_name} ({}) is already registered in namespace '{ns}'",
                    handle.name()
                ),
                None => write!(
                    f,
                    "type {type_name} ({}) is already registered in the global namespace",
                    handle.name()
                ),
            },
            Self::MalformedAux { handle, detail } => {
                write!(f, "malformed aux data for {handle}: {detail}")
            }
        }
    }
}

impl Error for RegistryError {}
