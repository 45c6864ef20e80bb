use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Is,
    Contains,
    Matches,
}

impl MatchType {
    pub fn as_sieve(&self) -> &'static str {
        match self {
            Self::Is => ":is",
            Self::Contains => ":contains",
            Self::Matches => ":matches",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeComparator {
    Over,
    Under,
}

impl SizeComparator {
    pub fn as_sieve(&self) -> &'static str {
        match self {
            Self::Over => ":over",
            Self::Under => ":under",
        }
    }
}

/// How the conditions of a rule combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOperator {
    AllOf,
    AnyOf,
}

impl LogicOperator {
    pub fn as_sieve(&self) -> &'static str {
        match self {
            Self::AllOf => "allof",
            Self::AnyOf => "anyof",
        }
    }

    /// Thunderbird prefixes every search term with `AND` or `OR`.
    pub fn from_thunderbird(s: &str) -> Option<Self> {
        match s {
            "AND" => Some(Self::AllOf),
            "OR" => Some(Self::AnyOf),
            _ => None,
        }
    }
}

/// Search operators understood by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Contains,
    DoesntContain,
    Is,
    Isnt,
    BeginsWith,
    EndsWith,
    IsGreaterThan,
    IsLessThan,
}

impl Operator {
    pub fn from_thunderbird(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "contains" => Some(Self::Contains),
            "doesn't contain" => Some(Self::DoesntContain),
            "is" => Some(Self::Is),
            "isn't" => Some(Self::Isnt),
            "begins with" => Some(Self::BeginsWith),
            "ends with" => Some(Self::EndsWith),
            "is greater than" => Some(Self::IsGreaterThan),
            "is less than" => Some(Self::IsLessThan),
            _ => None,
        }
    }

    /// Match type for string comparisons; `None` for size comparisons.
    pub fn match_type(&self) -> Option<MatchType> {
        match self {
            Self::Contains | Self::DoesntContain => Some(MatchType::Contains),
            Self::Is | Self::Isnt => Some(MatchType::Is),
            Self::BeginsWith | Self::EndsWith => Some(MatchType::Matches),
            Self::IsGreaterThan | Self::IsLessThan => None,
        }
    }

    pub fn size_comparator(&self) -> Option<SizeComparator> {
        match self {
            Self::IsGreaterThan => Some(SizeComparator::Over),
            Self::IsLessThan => Some(SizeComparator::Under),
            _ => None,
        }
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, Self::DoesntContain | Self::Isnt)
    }
}

/// SIEVE action commands the converter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Fileinto,
    Redirect,
    Discard,
    Stop,
    Addflag,
    Removeflag,
}

impl ActionType {
    pub fn as_sieve(&self) -> &'static str {
        match self {
            Self::Fileinto => "fileinto",
            Self::Redirect => "redirect",
            Self::Discard => "discard",
            Self::Stop => "stop",
            Self::Addflag => "addflag",
            Self::Removeflag => "removeflag",
        }
    }

    /// Extension that must appear in `require` for this command.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Fileinto => Some("fileinto"),
            Self::Addflag | Self::Removeflag => Some("imap4flags"),
            Self::Redirect | Self::Discard | Self::Stop => None,
        }
    }
}

/// Filter actions as Thunderbird names them in `action=` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    MoveToFolder,
    CopyToFolder,
    Forward,
    MarkRead,
    MarkUnread,
    MarkFlagged,
    AddTag,
    Delete,
    StopExecution,
}

impl FilterAction {
    pub fn as_thunderbird(&self) -> &'static str {
        match self {
            Self::MoveToFolder => "Move to folder",
            Self::CopyToFolder => "Copy to folder",
            Self::Forward => "Forward",
            Self::MarkRead => "Mark read",
            Self::MarkUnread => "Mark unread",
            Self::MarkFlagged => "Mark flagged",
            Self::AddTag => "AddTag",
            Self::Delete => "Delete",
            Self::StopExecution => "Stop execution",
        }
    }

    pub fn from_thunderbird(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "move to folder" => Some(Self::MoveToFolder),
            "copy to folder" => Some(Self::CopyToFolder),
            "forward" => Some(Self::Forward),
            "mark read" => Some(Self::MarkRead),
            "mark unread" => Some(Self::MarkUnread),
            "mark flagged" => Some(Self::MarkFlagged),
            "addtag" => Some(Self::AddTag),
            "delete" => Some(Self::Delete),
            "stop execution" => Some(Self::StopExecution),
            _ => None,
        }
    }

    /// Whether the action is meaningless without an `actionValue=` line.
    pub fn takes_value(&self) -> bool {
        matches!(
            self,
            Self::MoveToFolder | Self::CopyToFolder | Self::Forward | Self::AddTag
        )
    }
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_thunderbird())
    }
}
