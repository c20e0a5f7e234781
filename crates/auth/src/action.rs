use serde::{Deserialize, Serialize};

/// Operation a principal asks to perform on a resource.
///
/// The decision engine currently grants the same actions to every tenant
/// member; the action is carried for audit output and logging.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    List,
    Create,
    Update,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::List, Action::Create, Action::Update];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::List => "list",
            Action::Create => "create",
            Action::Update => "update",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
