use sha2::{Digest, Sha256};
use std::{
    borrow::Borrow,
    fmt::{self, Display},
};

/// Identifies an object in the descriptor's object table.
///
/// Xcode writes 96-bit hex strings, but any unquoted token can show up here
/// in descriptors produced by other tools, so this is stored as-is.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derives an ID from a role and a set of name parts, so repeat runs over
    /// the same input produce the same IDs. The digest is truncated to the
    /// 96 bits Xcode uses.
    pub fn derive(role: &str, parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(role.as_bytes());
        for part in parts {
            hasher.update([0u8]);
            hasher.update(part.as_bytes());
        }
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(24);
        for byte in &digest[..12] {
            hex.push_str(&format!("{:02X}", byte));
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
