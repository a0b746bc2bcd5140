use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Ownership context of a record: the acting user alone, or a shared group.
///
/// Every scoped query takes a `Scope`, so personal and group data cannot be
/// mixed by forgetting a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Personal,
    Group(Uuid),
}

impl Scope {
    pub fn group_id(self) -> Option<Uuid> {
        match self {
            Scope::Personal => None,
            Scope::Group(id) => Some(id),
        }
    }

    pub fn is_personal(self) -> bool {
        matches!(self, Scope::Personal)
    }
}

impl From<Option<Uuid>> for Scope {
    fn from(group_id: Option<Uuid>) -> Self {
        group_id.map_or(Scope::Personal, Scope::Group)
    }
}

/// On the wire a scope is the nullable group id.
impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.group_id().serialize(serializer)
    }
}
