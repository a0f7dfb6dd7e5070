use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::ClosureError;

/// Vendor register identifier (a UUID string in Lightspeed payloads).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterId(String);

impl RegisterId {
    pub fn new(id: impl Into<String>) -> Result<Self, ClosureError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ClosureError::Validation(
                "RegisterId must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Vendor outlet identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutletId(String);

impl OutletId {
    pub fn new(id: impl Into<String>) -> Result<Self, ClosureError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ClosureError::Validation("OutletId must not be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
