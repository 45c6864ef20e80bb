/// AST node types for the SIEVE scripts we generate (RFC 5228).
use crate::model::enums::{ActionType, MatchType, SizeComparator};

/// A complete SIEVE script is a list of commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `require ["ext1", "ext2"];`
    Require(Vec<String>),

    /// `if <test> { <actions> }` with optional elsif chain
    If(IfBlock),

    /// A comment line: `# text`
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBlock {
    /// Emitted as a `# rule:[name]` line above the branch
    pub name: Option<String>,
    pub condition: TestExpr,
    pub actions: Vec<ActionCommand>,
    pub alternatives: Vec<ElsIf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElsIf {
    pub name: Option<String>,
    pub condition: TestExpr,
    pub actions: Vec<ActionCommand>,
}

/// A test expression in an if/elsif condition.
#[derive(Debug, Clone, PartialEq)]
pub enum TestExpr {
    /// `allof (test1, test2, ...)`
    AllOf(Vec<TestExpr>),
    /// `anyof (test1, test2, ...)`
    AnyOf(Vec<TestExpr>),
    /// `not <test>`
    Not(Box<TestExpr>),
    /// `header :match_type "Header" "value"`
    Header {
        match_type: MatchType,
        header_names: Vec<String>,
        keys: Vec<String>,
    },
    /// `body :match_type "value"`
    Body {
        match_type: MatchType,
        keys: Vec<String>,
    },
    /// `size :over/:under <limit>`
    Size {
        comparator: SizeComparator,
        limit: String,
    },
    /// `true`
    True,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionCommand {
    pub action: ActionType,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    QuotedString(String),
    Tag(String),
}

/// The translation of one Thunderbird rule: a single conditional branch.
#[derive(Debug, Clone, PartialEq)]
pub struct SieveBlock {
    pub name: String,
    pub condition: TestExpr,
    pub actions: Vec<ActionCommand>,
}
