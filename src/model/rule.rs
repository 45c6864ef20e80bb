use crate::model::enums::LogicOperator;

/// One search term: `(attribute,operator,value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub attribute: String,
    /// Quoted attributes are arbitrary header names rather than built-in fields.
    pub custom_header: bool,
    pub operator: String,
    pub value: String,
}

/// The parsed `condition=` line of a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// No `condition=` line was present.
    Missing,
    /// `condition="ALL"`: the rule matches every message.
    All,
    Terms {
        logic: LogicOperator,
        conditions: Vec<Condition>,
    },
    /// Kept so the mapper can report it against the rule.
    Malformed { raw: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: String,
    pub value: Option<String>,
}

/// One Thunderbird filter entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub enabled: bool,
    pub criteria: Criteria,
    pub actions: Vec<Action>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            criteria: Criteria::Missing,
            actions: Vec::new(),
        }
    }
}
