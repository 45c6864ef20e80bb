/// Parser for the `condition=` expression of a Thunderbird filter.
///
/// The expression is either `ALL` or a run of search terms such as
/// `AND (subject,contains,free money) AND ("X-Spam",is,yes)`. Attribute and
/// value may be wrapped in double quotes, with `\"` and `\\` as escapes.
use crate::model::enums::LogicOperator;
use crate::model::rule::{Condition, Criteria};

pub fn parse_criteria(raw: &str) -> Criteria {
    let text = raw.trim();
    if text.eq_ignore_ascii_case("ALL") {
        return Criteria::All;
    }
    match parse_terms(text) {
        Ok((logic, conditions)) => Criteria::Terms { logic, conditions },
        Err(reason) => Criteria::Malformed {
            raw: text.to_string(),
            reason,
        },
    }
}

fn parse_terms(text: &str) -> Result<(LogicOperator, Vec<Condition>), String> {
    let mut rest = text;
    let mut logic: Option<LogicOperator> = None;
    let mut conditions = Vec::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let word_end = rest
            .find(|c: char| c.is_whitespace() || c == '(')
            .unwrap_or(rest.len());
        let word = &rest[..word_end];
        let op = LogicOperator::from_thunderbird(word)
            .ok_or_else(|| format!("expected AND or OR, found '{word}'"))?;
        match logic {
            Some(prev) if prev != op => return Err("mixes AND and OR terms".to_string()),
            _ => logic = Some(op),
        }

        rest = rest[word_end..].trim_start();
        rest = rest
            .strip_prefix('(')
            .ok_or_else(|| format!("expected '(' after {word}"))?;
        let inner = rest.trim_start();
        if inner.starts_with('(') || inner.starts_with("AND ") || inner.starts_with("OR ") {
            return Err("nested groups are not supported".to_string());
        }

        let (attribute, custom_header, after) = read_field(rest, ',')?;
        let (operator, _, after) = read_field(after, ',')?;
        let (value, after) = read_value(after)?;
        conditions.push(Condition {
            attribute,
            custom_header,
            operator,
            value,
        });
        rest = after;
    }

    match logic {
        Some(logic) => Ok((logic, conditions)),
        None => Err("no search terms".to_string()),
    }
}

/// Reads one field up to `terminator`, returning the field, whether it was
/// quoted, and the input after the terminator.
fn read_field(input: &str, terminator: char) -> Result<(String, bool, &str), String> {
    let trimmed = input.trim_start();
    if let Some((text, after)) = read_quoted(trimmed) {
        if let Some(rest) = after.trim_start().strip_prefix(terminator) {
            return Ok((text, true, rest));
        }
    }

    // Unquoted, or quotes that do not close the field: keep the raw text so
    // the stray quotes can be sanitized later.
    let end = trimmed
        .find(terminator)
        .ok_or_else(|| format!("expected '{terminator}' in search term"))?;
    let raw = trimmed[..end].trim();
    Ok((raw.to_string(), raw.starts_with('"'), &trimmed[end + 1..]))
}

/// Reads the value field, which ends at the `)` closing the term.
fn read_value(input: &str) -> Result<(String, &str), String> {
    let trimmed = input.trim_start();
    if let Some((text, after)) = read_quoted(trimmed) {
        if let Some(rest) = after.trim_start().strip_prefix(')') {
            if ends_term(rest) {
                return Ok((text, rest));
            }
        }
    }

    // An unquoted value may itself contain ')', so only a ')' that is followed
    // by the next term or the end of input closes it.
    for (idx, _) in trimmed.match_indices(')') {
        let rest = &trimmed[idx + 1..];
        if ends_term(rest) {
            return Ok((trimmed[..idx].trim().to_string(), rest));
        }
    }
    Err("unterminated search term".to_string())
}

fn ends_term(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.is_empty()
        || ["AND ", "OR ", "AND(", "OR("]
            .iter()
            .any(|prefix| rest.starts_with(prefix))
}

/// Reads a `"..."` string with backslash escapes. Returns `None` if the input
/// does not start with a quote or the quote never closes.
fn read_quoted(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('"')?;
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, next) = chars.next()?;
                out.push(next);
            }
            '"' => return Some((out, &body[idx + 1..])),
            _ => out.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(raw: &str) -> (LogicOperator, Vec<Condition>) {
        match parse_criteria(raw) {
            Criteria::Terms { logic, conditions } => (logic, conditions),
            other => panic!("Expected terms, got {other:?}"),
        }
    }

    #[test]
    fn test_single_and_term() {
        let (logic, conds) = terms("AND (subject,contains,free money)");
        assert_eq!(logic, LogicOperator::AllOf);
        assert_eq!(conds.len(), 1);
        assert_eq!(conds[0].attribute, "subject");
        assert!(!conds[0].custom_header);
        assert_eq!(conds[0].operator, "contains");
        assert_eq!(conds[0].value, "free money");
    }

    #[test]
    fn test_or_terms_keep_order() {
        let (logic, conds) = terms("OR (from,contains,a@x.org) OR (from,ends with,@y.org)");
        assert_eq!(logic, LogicOperator::AnyOf);
        let values: Vec<_> = conds.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["a@x.org", "@y.org"]);
        assert_eq!(conds[1].operator, "ends with");
    }

    #[test]
    fn test_quoted_custom_header_and_value() {
        let (_, conds) = terms(r#"AND ("X-Spam-Flag",is,"a, b (c)")"#);
        assert_eq!(conds[0].attribute, "X-Spam-Flag");
        assert!(conds[0].custom_header);
        assert_eq!(conds[0].value, "a, b (c)");
    }

    #[test]
    fn test_unquoted_value_with_paren() {
        let (_, conds) = terms("AND (subject,contains,[list] (weekly)) AND (to,is,me@x.org)");
        assert_eq!(conds.len(), 2);
        assert_eq!(conds[0].value, "[list] (weekly)");
        assert_eq!(conds[1].value, "me@x.org");
    }

    #[test]
    fn test_doubled_quotes_are_kept_raw() {
        let (_, conds) = terms(r#"AND (subject,contains,""received"")"#);
        assert_eq!(conds[0].value, r#"""received"""#);
    }

    #[test]
    fn test_all_matches_everything() {
        assert_eq!(parse_criteria(" ALL "), Criteria::All);
    }

    #[test]
    fn test_mixed_logic_is_malformed() {
        let c = parse_criteria("AND (subject,contains,a) OR (subject,contains,b)");
        assert!(matches!(c, Criteria::Malformed { reason, .. } if reason.contains("mixes")));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(parse_criteria("subject contains x"), Criteria::Malformed { .. }));
        assert!(matches!(parse_criteria("AND (subject,contains"), Criteria::Malformed { .. }));
        assert!(matches!(parse_criteria(""), Criteria::Malformed { .. }));
    }
}
