//! # Acting User
//!
//! Identity and capabilities of whoever made the request, as resolved by
//! the host's session boundary.

use std::collections::BTreeSet;

/// Capability required to read the blocks product endpoints
pub const EDIT_POSTS: &str = "edit_posts";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<u64>,
    pub capabilities: BTreeSet<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: u64, capabilities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            user_id: Some(user_id),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

pub trait ViewerResolver: Send + Sync {
    /// Resolve a bearer credential; unknown or missing credentials are anonymous
    fn resolve(&self, bearer: Option<&str>) -> Viewer;
}
