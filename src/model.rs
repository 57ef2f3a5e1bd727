use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The workflow labels the application itself writes. Stored items may carry
/// other text in `state`, since `update_item` does not validate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Todo,
    InProgress,
    Done,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_state() -> String {
    State::Todo.as_str().to_string()
}

/// A task record. `id` is `None` until the store assigns one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            id: None,
            summary: String::new(),
            owner: None,
            state: default_state(),
        }
    }
}

impl Item {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Owner with the unset case read as empty, matching what gets stored.
    pub fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or("")
    }

    /// Compares summary, owner and state. The id is ignored, so a stored item
    /// matches the value it was created from.
    pub fn same_content(&self, other: &Item) -> bool {
        self.summary == other.summary && self.owner() == other.owner() && self.state == other.state
    }
}

/// The columns a partial update may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Summary,
    Owner,
    State,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Owner => "owner",
            Self::State => "state",
        }
    }
}

/// A partial update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemPatch {
    pub summary: Option<String>,
    pub owner: Option<String>,
    pub state: Option<String>,
}

impl ItemPatch {
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// The set fields as column/value pairs, in column order.
    pub fn fields(&self) -> Vec<(Field, String)> {
        [
            (Field::Summary, &self.summary),
            (Field::Owner, &self.owner),
            (Field::State, &self.state),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect()
    }
}
