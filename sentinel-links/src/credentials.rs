//! Api keys for the content providers
//!
//! Keys come from the environment or from the command line. They are kept in
//! a [`SecretKey`], which never prints its value and is wiped on drop.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Result, error::LinksError};

/// An api key or integration token.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wraps a key. Returns a configuration error if the key is empty or blank.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(LinksError::Config {
                message: "API key is empty".to_string(),
            });
        }
        Ok(Self(key.trim().to_string()))
    }

    /// Reads a key from the environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Self::new(value),
            _ => Err(LinksError::Config {
                message: format!("environment variable {var} is not set"),
            }),
        }
    }

    /// Converts an optional configured value into a key, ignoring blank values.
    pub fn from_option(key: Option<&str>) -> Option<Self> {
        key.and_then(|key| Self::new(key).ok())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}
