//! WorkerId - Cheap-to-clone worker identifier, and the ordered fleet roster
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::ContractError;

/// Worker identifier with cheap cloning.
///
/// Internally uses `Arc<str>` so cloning only increments a reference count
/// instead of allocating new memory. Worker IDs are assigned once at
/// registration and then cloned into every reading and snapshot.
///
/// # Examples
/// ```
/// use contracts::WorkerId;
///
/// let id: WorkerId = "Worker 1".into();
/// let id2 = id.clone();  // O(1) - just increments ref count
/// assert_eq!(id, id2);
/// assert_eq!(id.as_str(), "Worker 1");
/// ```
#[derive(Clone, Default)]
pub struct WorkerId(Arc<str>);

impl WorkerId {
    /// Create a new WorkerId from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for WorkerId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for WorkerId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WorkerId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkerId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for WorkerId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerId({:?})", self.0)
    }
}

impl PartialEq for WorkerId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for WorkerId {}

impl PartialEq<str> for WorkerId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for WorkerId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for WorkerId {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

// Hash - same as str hash for HashMap compatibility
impl Hash for WorkerId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for WorkerId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WorkerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

/// Ordered fleet membership.
///
/// The roster decides both which workers belong to the fleet and the order
/// they appear in every snapshot. IDs are unique; an empty roster is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WorkerId>", into = "Vec<WorkerId>")]
pub struct Roster(Vec<WorkerId>);

impl Roster {
    /// Build a roster, rejecting duplicate IDs.
    pub fn new(workers: Vec<WorkerId>) -> Result<Self, ContractError> {
        let mut seen = HashSet::with_capacity(workers.len());
        for (idx, worker) in workers.iter().enumerate() {
            if !seen.insert(worker.as_str()) {
                return Err(ContractError::config_validation(
                    format!("fleet.workers[{idx}]"),
                    format!("duplicate worker_id '{worker}'"),
                ));
            }
        }
        Ok(Self(workers))
    }

    /// `"Worker 1"` .. `"Worker n"`.
    pub fn synthetic(count: usize) -> Self {
        Self(
            (1..=count)
                .map(|i| WorkerId::from(format!("Worker {i}")))
                .collect(),
        )
    }

    pub fn workers(&self) -> &[WorkerId] {
        &self.0
    }
}

impl Deref for Roster {
    type Target = [WorkerId];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<WorkerId>> for Roster {
    type Error = ContractError;

    fn try_from(workers: Vec<WorkerId>) -> Result<Self, Self::Error> {
        Self::new(workers)
    }
}

impl From<Roster> for Vec<WorkerId> {
    fn from(roster: Roster) -> Self {
        roster.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_is_cheap() {
        let id1: WorkerId = "Worker 7".into();
        let id2 = id1.clone();

        assert_eq!(id1.as_str().as_ptr(), id2.as_str().as_ptr());
    }

    #[test]
    fn test_equality() {
        let id: WorkerId = "Worker 1".into();
        assert_eq!(id, "Worker 1");
        assert_eq!(id, String::from("Worker 1"));
        assert_eq!(id, WorkerId::from("Worker 1"));
    }

    #[test]
    fn test_hashmap_key() {
        let mut map: HashMap<WorkerId, bool> = HashMap::new();
        map.insert("Worker 1".into(), true);
        map.insert("Worker 2".into(), false);

        // Can lookup with &str
        assert_eq!(map.get("Worker 1"), Some(&true));
        assert_eq!(map.get("Worker 2"), Some(&false));
    }

    #[test]
    fn test_serde() {
        let id: WorkerId = "Worker 3".into();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Worker 3\"");

        let parsed: WorkerId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_synthetic_roster() {
        let roster = Roster::synthetic(20);
        assert_eq!(roster.len(), 20);
        assert_eq!(roster[0], "Worker 1");
        assert_eq!(roster[19], "Worker 20");
        assert!(Roster::synthetic(0).is_empty());
    }

    #[test]
    fn test_roster_rejects_duplicates() {
        let result = Roster::new(vec!["A".into(), "B".into(), "A".into()]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate worker_id 'A'"), "got: {err}");
    }

    #[test]
    fn test_roster_deserialize_validates() {
        let ok: Roster = serde_json::from_str(r#"["A", "B"]"#).unwrap();
        assert_eq!(ok.workers(), &[WorkerId::from("A"), WorkerId::from("B")]);

        let dup: Result<Roster, _> = serde_json::from_str(r#"["A", "A"]"#);
        assert!(dup.is_err());
    }
}
