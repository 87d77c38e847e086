// ABOUTME: Ordered pool of generation API credentials with a circular rotation cursor
// ABOUTME: Credential newtype masks secrets in Debug/Display so keys never reach logs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Credential Pool
//!
//! A [`KeyPool`] holds the API keys provisioned for the generation endpoint in
//! configuration order. Membership is fixed at construction; only the cursor
//! moves. The pool is deliberately not synchronized: the
//! [`ResilientExecutor`](crate::resilience::ResilientExecutor) owns it behind a
//! lock and decides how callers share it.

use std::fmt;

/// Number of trailing characters shown when a credential is masked
const VISIBLE_SUFFIX_CHARS: usize = 5;

/// An opaque API credential
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential string
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for handing to the generation provider only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form safe for logs: `...` followed by the last five characters
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= VISIBLE_SUFFIX_CHARS {
            return "...".to_owned();
        }
        let suffix: String = chars[chars.len() - VISIBLE_SUFFIX_CHARS..].iter().collect();
        format!("...{suffix}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for Credential {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

/// Ordered credential set with a rotation cursor
///
/// Invariant: when the pool is non-empty, `cursor < credentials.len()`.
#[derive(Debug, Clone, Default)]
pub struct KeyPool {
    credentials: Vec<Credential>,
    cursor: usize,
}

impl KeyPool {
    /// Create a pool from credentials in rotation order; may be empty
    #[must_use]
    pub fn new<I, C>(credentials: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Credential>,
    {
        Self {
            credentials: credentials.into_iter().map(Into::into).collect(),
            cursor: 0,
        }
    }

    /// Credential under the cursor, or `None` for an empty pool
    #[must_use]
    pub fn current(&self) -> Option<&Credential> {
        self.credentials.get(self.cursor)
    }

    /// Advance the cursor circularly and return the new current credential
    ///
    /// No-op returning `None` on an empty pool.
    pub fn rotate(&mut self) -> Option<&Credential> {
        if self.credentials.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.credentials.len();
        self.current()
    }

    /// Number of credentials
    #[must_use]
    pub fn size(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the pool has no credentials
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Current cursor position
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }
}
