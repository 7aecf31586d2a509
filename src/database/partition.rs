use std::fmt;

use crate::models::{AuthenticatedUser, InvalidRecordId, RecordId};

const PARTITION_PREFIX: &str = "tenant_";

/// Name of the logical store that holds one user's records.
///
/// The only constructor takes a verified session identity, so handler code
/// cannot address a partition for an arbitrary user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    name: String,
}

impl Partition {
    pub fn for_user(user: &AuthenticatedUser) -> Result<Self, InvalidRecordId> {
        Self::for_user_id(&user.id)
    }

    /// Also used by the admin CLI, which provisions partitions ahead of
    /// the user's first sign-in.
    pub fn for_user_id(user_id: &str) -> Result<Self, InvalidRecordId> {
        let id = RecordId::parse(user_id)?;
        Ok(Self {
            name: format!("{PARTITION_PREFIX}{id}"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checked again before the name is interpolated into SQL.
    pub fn is_valid_name(name: &str) -> bool {
        match name.strip_prefix(PARTITION_PREFIX) {
            Some(rest) => rest.len() == 24 && rest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
            None => false,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
