/// Line parser for Thunderbird's `msgFilterRules.dat`.
///
/// Every line is `key="value"`. A `name=` line starts a new rule, a blank
/// line closes the current one. Unknown keys and junk lines are logged and
/// skipped so one odd line never loses the rest of the file.
use tracing::{debug, warn};

use crate::model::rule::{Action, Rule};
use crate::thunderbird::condition::parse_criteria;

const UNNAMED: &str = "Unnamed Filter";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterFile {
    pub version: Option<String>,
    pub rules: Vec<Rule>,
}

pub fn parse(input: &str) -> FilterFile {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut file = FilterFile::default();
    let mut current: Option<Rule> = None;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            if let Some(rule) = current.take() {
                file.rules.push(rule);
            }
            continue;
        }

        let Some((key, raw_value)) = line.split_once('=') else {
            warn!(line = line_no, "ignoring line without '=': {line}");
            continue;
        };
        let key = key.trim();
        let value = unquote_value(raw_value);

        if key == "name" {
            if let Some(rule) = current.take() {
                file.rules.push(rule);
            }
            let name = if value.is_empty() { UNNAMED.to_string() } else { value };
            current = Some(Rule {
                name,
                ..Default::default()
            });
            continue;
        }

        match current.as_mut() {
            Some(rule) => apply_key(rule, key, value, line_no),
            None if key == "version" => file.version = Some(value),
            None if key == "logging" => debug!(line = line_no, "logging={value}"),
            None => warn!(line = line_no, "ignoring '{key}' outside of a rule"),
        }
    }

    if let Some(rule) = current.take() {
        file.rules.push(rule);
    }

    debug!(rules = file.rules.len(), version = ?file.version, "parsed filter file");
    file
}

fn apply_key(rule: &mut Rule, key: &str, value: String, line_no: usize) {
    match key {
        "enabled" => rule.enabled = !value.eq_ignore_ascii_case("no"),
        "action" => rule.actions.push(Action {
            kind: value,
            value: None,
        }),
        "actionValue" => match rule.actions.last_mut() {
            Some(action) => action.value = Some(value),
            None => warn!(line = line_no, rule = %rule.name, "actionValue without an action"),
        },
        "condition" => rule.criteria = parse_criteria(&value),
        "type" | "description" | "customId" => {}
        _ => debug!(line = line_no, rule = %rule.name, "ignoring unknown key '{key}'"),
    }
}

/// Strips the surrounding quotes of a value and resolves `\"` and `\\`.
/// Values without surrounding quotes are taken as they are.
fn unquote_value(raw: &str) -> String {
    let raw = raw.trim();
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::LogicOperator;
    use crate::model::rule::Criteria;

    const TWO_RULES: &str = r#"version="9"
logging="no"
name="Spam"
enabled="yes"
type="17"
action="Move to folder"
actionValue="imap://me%40example.org@imap.example.org/INBOX/Junk"
action="Mark read"
condition="AND (subject,contains,free money)"
name="Lists"
enabled="no"
type="17"
action="Copy to folder"
actionValue="mailbox://nobody@Local%20Folders/Lists"
condition="OR (to,is,list@example.org) OR (\"List-Id\",contains,rust)"
"#;

    #[test]
    fn test_parse_rules_in_order() {
        let file = parse(TWO_RULES);
        assert_eq!(file.version.as_deref(), Some("9"));
        assert_eq!(file.rules.len(), 2);
        assert_eq!(file.rules[0].name, "Spam");
        assert_eq!(file.rules[1].name, "Lists");
        assert!(file.rules[0].enabled);
        assert!(!file.rules[1].enabled);
    }

    #[test]
    fn test_action_values_pair_with_their_action() {
        let file = parse(TWO_RULES);
        let actions = &file.rules[0].actions;
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, "Move to folder");
        assert!(actions[0].value.as_deref().unwrap().ends_with("/INBOX/Junk"));
        assert_eq!(actions[1].kind, "Mark read");
        assert_eq!(actions[1].value, None);
    }

    #[test]
    fn test_escaped_quotes_reach_condition_parser() {
        let file = parse(TWO_RULES);
        match &file.rules[1].criteria {
            Criteria::Terms { logic, conditions } => {
                assert_eq!(*logic, LogicOperator::AnyOf);
                assert_eq!(conditions[1].attribute, "List-Id");
                assert!(conditions[1].custom_header);
            }
            other => panic!("Expected terms, got {other:?}"),
        }
    }

    #[test]
    fn test_tolerates_whitespace_and_missing_fields() {
        let input = "name=\"Bare\"   \r\n   condition=\"ALL\"  \r\n";
        let file = parse(input);
        assert_eq!(file.rules.len(), 1);
        assert_eq!(file.rules[0].criteria, Criteria::All);
        assert!(file.rules[0].actions.is_empty());
        assert!(file.rules[0].enabled);
    }

    #[test]
    fn test_blank_line_closes_rule() {
        let input = "name=\"A\"\n\ncondition=\"ALL\"\nname=\"B\"\n";
        let file = parse(input);
        assert_eq!(file.rules.len(), 2);
        assert_eq!(file.rules[0].criteria, Criteria::Missing);
    }

    #[test]
    fn test_empty_name_gets_placeholder() {
        let file = parse("name=\"\"\n");
        assert_eq!(file.rules[0].name, UNNAMED);
    }

    #[test]
    fn test_empty_and_header_only_input() {
        assert!(parse("").rules.is_empty());
        assert!(parse("version=\"9\"\nlogging=\"no\"\n").rules.is_empty());
        assert!(parse("not a rule file\n").rules.is_empty());
    }

    #[test]
    fn test_unquote_value() {
        assert_eq!(unquote_value(r#""a \"b\" c""#), r#"a "b" c"#);
        assert_eq!(unquote_value(r#""back\\slash""#), r"back\slash");
        assert_eq!(unquote_value("plain "), "plain");
    }
}
