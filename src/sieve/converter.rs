/// Maps parsed Thunderbird rules onto SIEVE blocks.
///
/// Each rule either becomes one [`SieveBlock`] or is rejected with a
/// [`RuleError`] naming the construct that has no SIEVE counterpart.
use std::borrow::Cow;

use url::Url;

use crate::config::options::ConvertOptions;
use crate::error::{QuoteWarning, RuleError};
use crate::model::enums::*;
use crate::model::rule::{Action, Condition, Criteria, Rule};
use crate::sieve::ast::*;

/// A converted rule together with the quote fixes applied on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRule {
    pub block: SieveBlock,
    pub warnings: Vec<QuoteWarning>,
}

/// What a search attribute tests against.
enum Target {
    Headers(Vec<String>),
    Body,
    Size,
}

pub fn rule_to_block(rule: &Rule, options: &ConvertOptions) -> Result<MappedRule, RuleError> {
    if !rule.enabled {
        return Err(RuleError::Disabled);
    }

    let mut warnings = Vec::new();
    let condition = build_test_expr(rule, &mut warnings)?;
    let actions = build_action_commands(&rule.actions, options)?;
    if actions.is_empty() {
        return Err(RuleError::NoActions);
    }

    Ok(MappedRule {
        block: SieveBlock {
            name: rule.name.clone(),
            condition,
            actions,
        },
        warnings,
    })
}

fn build_test_expr(rule: &Rule, warnings: &mut Vec<QuoteWarning>) -> Result<TestExpr, RuleError> {
    let (logic, conditions) = match &rule.criteria {
        Criteria::Missing => return Err(RuleError::NoConditions),
        Criteria::All => return Ok(TestExpr::True),
        Criteria::Malformed { raw, reason } => {
            return Err(RuleError::MalformedCondition {
                raw: raw.clone(),
                reason: reason.clone(),
            })
        }
        Criteria::Terms { logic, conditions } => (*logic, conditions),
    };

    let mut tests = conditions
        .iter()
        .map(|cond| condition_to_test_expr(cond, &rule.name, warnings))
        .collect::<Result<Vec<_>, _>>()?;

    match tests.len() {
        0 => Err(RuleError::NoConditions),
        1 => Ok(tests.remove(0)),
        _ => Ok(match logic {
            LogicOperator::AllOf => TestExpr::AllOf(tests),
            LogicOperator::AnyOf => TestExpr::AnyOf(tests),
        }),
    }
}

fn condition_to_test_expr(
    cond: &Condition,
    rule_name: &str,
    warnings: &mut Vec<QuoteWarning>,
) -> Result<TestExpr, RuleError> {
    let attribute = sanitize_field(rule_name, "header", &cond.attribute, warnings);
    let value = sanitize_field(rule_name, "value", &cond.value, warnings);

    let unsupported = || RuleError::UnsupportedOperator {
        attribute: attribute.clone(),
        operator: cond.operator.clone(),
    };
    let operator = Operator::from_thunderbird(&cond.operator).ok_or_else(unsupported)?;
    let target = if cond.custom_header {
        Target::Headers(vec![attribute.clone()])
    } else {
        builtin_target(&attribute)?
    };

    if let Target::Size = target {
        let comparator = operator.size_comparator().ok_or_else(unsupported)?;
        let kilobytes: u64 = value.trim().parse().map_err(|_| RuleError::MalformedCondition {
            raw: value.clone(),
            reason: "size is not a whole number of KB".to_string(),
        })?;
        return Ok(TestExpr::Size {
            comparator,
            limit: format!("{kilobytes}K"),
        });
    }

    let match_type = operator.match_type().ok_or_else(unsupported)?;
    let key = match operator {
        Operator::BeginsWith => format!("{}*", escape_wildcards(&value)),
        Operator::EndsWith => format!("*{}", escape_wildcards(&value)),
        _ => value,
    };
    let test = match target {
        Target::Headers(header_names) => TestExpr::Header {
            match_type,
            header_names,
            keys: vec![key],
        },
        Target::Body | Target::Size => TestExpr::Body {
            match_type,
            keys: vec![key],
        },
    };

    if operator.is_negated() {
        Ok(TestExpr::Not(Box::new(test)))
    } else {
        Ok(test)
    }
}

fn builtin_target(attribute: &str) -> Result<Target, RuleError> {
    let headers = |names: &[&str]| Target::Headers(names.iter().map(|n| n.to_string()).collect());
    match attribute.trim().to_lowercase().as_str() {
        "from" => Ok(headers(&["From"])),
        "subject" => Ok(headers(&["Subject"])),
        "to" => Ok(headers(&["To"])),
        "cc" => Ok(headers(&["Cc"])),
        "to or cc" => Ok(headers(&["To", "Cc"])),
        "all addresses" => Ok(headers(&["From", "To", "Cc", "Bcc"])),
        "body" => Ok(Target::Body),
        "size" => Ok(Target::Size),
        _ => Err(RuleError::UnsupportedField(attribute.to_string())),
    }
}

/// Removes quoting that survived parsing: redundant enclosing quote pairs
/// and `\"` escapes. Returns the cleaned text and whether anything looked
/// off. Quotes left inside the text are escaped by the emitter, so the
/// output never carries a doubled `""value""` pair.
///
/// A pair is only stripped if something remains inside it. A value made of
/// quotes alone keeps them, since an empty key would match every message.
pub fn sanitize_quotes(input: &str) -> (String, bool) {
    let mut text = input.trim();
    let mut stripped = false;
    while text.len() > 2 && text.starts_with('"') && text.ends_with('"') {
        text = &text[1..text.len() - 1];
        stripped = true;
    }
    let unescaped = text.replace("\\\"", "\"");
    let suspicious = stripped || unescaped.contains('"');
    (unescaped, suspicious)
}

fn sanitize_field(
    rule_name: &str,
    field: &str,
    input: &str,
    warnings: &mut Vec<QuoteWarning>,
) -> String {
    let (sanitized, suspicious) = sanitize_quotes(input);
    if suspicious {
        warnings.push(QuoteWarning {
            rule: rule_name.to_string(),
            field: field.to_string(),
            original: input.to_string(),
            sanitized: sanitized.clone(),
        });
    }
    sanitized
}

/// `:matches` treats `*`, `?` and `\` specially.
fn escape_wildcards(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn build_action_commands(
    actions: &[Action],
    options: &ConvertOptions,
) -> Result<Vec<ActionCommand>, RuleError> {
    actions
        .iter()
        .map(|action| action_to_command(action, options))
        .collect()
}

fn action_to_command(
    action: &Action,
    options: &ConvertOptions,
) -> Result<ActionCommand, RuleError> {
    let kind = FilterAction::from_thunderbird(&action.kind)
        .ok_or_else(|| RuleError::UnsupportedAction(action.kind.clone()))?;
    let value = action.value.as_deref().map(str::trim).unwrap_or_default();
    if kind.takes_value() && value.is_empty() {
        return Err(RuleError::MissingActionValue(kind.to_string()));
    }

    let command =
        |action: ActionType, arguments: Vec<Argument>| ActionCommand { action, arguments };
    let quoted = |s: &str| Argument::QuotedString(s.to_string());

    Ok(match kind {
        FilterAction::MoveToFolder => command(
            ActionType::Fileinto,
            vec![Argument::QuotedString(folder_to_mailbox(value, options)?)],
        ),
        FilterAction::CopyToFolder => command(
            ActionType::Fileinto,
            vec![
                Argument::Tag(":copy".to_string()),
                Argument::QuotedString(folder_to_mailbox(value, options)?),
            ],
        ),
        FilterAction::Forward => command(ActionType::Redirect, vec![quoted(value)]),
        FilterAction::MarkRead => command(ActionType::Addflag, vec![quoted("\\Seen")]),
        FilterAction::MarkUnread => command(ActionType::Removeflag, vec![quoted("\\Seen")]),
        FilterAction::MarkFlagged => command(ActionType::Addflag, vec![quoted("\\Flagged")]),
        FilterAction::AddTag => command(ActionType::Addflag, vec![quoted(value)]),
        FilterAction::Delete => command(ActionType::Discard, vec![]),
        FilterAction::StopExecution => command(ActionType::Stop, vec![]),
    })
}

/// Turns a Thunderbird folder URI into a server mailbox name, e.g.
/// `imap://me@host/INBOX/Lists/Rust` into `INBOX.Lists.Rust`. Values that
/// are not URIs are taken as mailbox names already.
pub fn folder_to_mailbox(value: &str, options: &ConvertOptions) -> Result<String, RuleError> {
    let segments: Vec<String> = match Url::parse(value) {
        Ok(url) => match url.path_segments() {
            Some(segments) => segments
                .filter(|s| !s.is_empty())
                .map(|s| {
                    urlencoding::decode(s)
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| s.to_string())
                })
                .collect(),
            None => return Ok(value.to_string()),
        },
        Err(_) => return Ok(value.to_string()),
    };

    let mut segments = segments.as_slice();
    if segments.first().is_some_and(|s| s.eq_ignore_ascii_case("INBOX")) {
        segments = &segments[1..];
    }
    if segments.first().is_some_and(|s| s.eq_ignore_ascii_case("Trash")) {
        return Err(RuleError::TrashTarget(value.to_string()));
    }

    let sep = options.folder_separator;
    let mut mailbox = options.folder_prefix.clone();
    for segment in segments {
        if !mailbox.is_empty() {
            mailbox.push(sep);
        }
        mailbox.push_str(&segment.replace(sep, "-"));
    }
    if mailbox.is_empty() {
        mailbox.push_str("INBOX");
    }
    Ok(mailbox)
}
