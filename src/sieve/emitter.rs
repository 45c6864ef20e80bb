/// Emit SIEVE script text from AST nodes.
use std::collections::BTreeSet;

use crate::model::enums::LogicOperator;
use crate::sieve::ast::*;

/// Assembles converted blocks into a script: a `require` line for the
/// extensions they use, then either one `if`/`elsif` chain or one `if`
/// per block, in input order.
pub fn build_script(blocks: Vec<SieveBlock>, chain: bool) -> Script {
    let mut commands = Vec::new();
    let mut blocks = blocks.into_iter();

    if chain {
        if let Some(first) = blocks.next() {
            let alternatives = blocks
                .map(|b| ElsIf {
                    name: Some(b.name),
                    condition: b.condition,
                    actions: b.actions,
                })
                .collect();
            commands.push(Command::If(IfBlock {
                name: Some(first.name),
                condition: first.condition,
                actions: first.actions,
                alternatives,
            }));
        }
    } else {
        commands.extend(blocks.map(|b| {
            Command::If(IfBlock {
                name: Some(b.name),
                condition: b.condition,
                actions: b.actions,
                alternatives: Vec::new(),
            })
        }));
    }

    let mut script = Script { commands };
    let requires = compute_requires(&script);
    if !requires.is_empty() {
        script.commands.insert(0, Command::Require(requires));
    }
    script
}

pub fn emit(script: &Script) -> String {
    let mut out = String::new();
    let mut first = true;

    for cmd in &script.commands {
        if !first {
            out.push('\n');
        }
        first = false;
        match cmd {
            Command::Require(exts) => {
                out.push_str("require ");
                emit_string_or_list(&mut out, exts);
                out.push_str(";\n");
            }
            Command::If(block) => emit_if_block(&mut out, block),
            Command::Comment(text) => emit_comment(&mut out, text),
        }
    }

    out
}

fn emit_comment(out: &mut String, text: &str) {
    for line in text.lines() {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
}

fn emit_rule_name(out: &mut String, name: &Option<String>) {
    if let Some(name) = name {
        // A line break inside the name would end the comment early.
        let name = name.replace(['\r', '\n'], " ");
        out.push_str(&format!("# rule:[{name}]\n"));
    }
}

fn emit_if_block(out: &mut String, block: &IfBlock) {
    emit_rule_name(out, &block.name);
    out.push_str("if ");
    emit_test_expr(out, &block.condition);
    out.push_str(" {\n");
    for action in &block.actions {
        emit_action(out, action, 1);
    }
    out.push_str("}\n");

    for alt in &block.alternatives {
        emit_rule_name(out, &alt.name);
        out.push_str("elsif ");
        emit_test_expr(out, &alt.condition);
        out.push_str(" {\n");
        for action in &alt.actions {
            emit_action(out, action, 1);
        }
        out.push_str("}\n");
    }
}

fn emit_test_expr(out: &mut String, expr: &TestExpr) {
    match expr {
        TestExpr::AllOf(tests) => emit_test_list(out, LogicOperator::AllOf, tests),
        TestExpr::AnyOf(tests) => emit_test_list(out, LogicOperator::AnyOf, tests),
        TestExpr::Not(inner) => {
            out.push_str("not ");
            emit_test_expr(out, inner);
        }
        TestExpr::Header {
            match_type,
            header_names,
            keys,
        } => {
            out.push_str("header ");
            out.push_str(match_type.as_sieve());
            out.push(' ');
            emit_string_or_list(out, header_names);
            out.push(' ');
            emit_string_or_list(out, keys);
        }
        TestExpr::Body { match_type, keys } => {
            out.push_str("body ");
            out.push_str(match_type.as_sieve());
            out.push(' ');
            emit_string_or_list(out, keys);
        }
        TestExpr::Size { comparator, limit } => {
            out.push_str("size ");
            out.push_str(comparator.as_sieve());
            out.push(' ');
            out.push_str(limit);
        }
        TestExpr::True => out.push_str("true"),
    }
}

fn emit_test_list(out: &mut String, logic: LogicOperator, tests: &[TestExpr]) {
    out.push_str(logic.as_sieve());
    out.push_str(" (");
    for (i, test) in tests.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        emit_test_expr(out, test);
    }
    out.push(')');
}

fn emit_string_or_list(out: &mut String, items: &[String]) {
    if items.len() == 1 {
        out.push_str(&format!("\"{}\"", escape_sieve_string(&items[0])));
    } else {
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("\"{}\"", escape_sieve_string(item)));
        }
        out.push(']');
    }
}

/// Every string leaves here wrapped in exactly one pair of quotes.
pub fn escape_sieve_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn emit_action(out: &mut String, action: &ActionCommand, indent: usize) {
    let prefix = "    ".repeat(indent);
    out.push_str(&prefix);
    out.push_str(action.action.as_sieve());
    for arg in &action.arguments {
        out.push(' ');
        match arg {
            Argument::QuotedString(s) => {
                out.push_str(&format!("\"{}\"", escape_sieve_string(s)));
            }
            Argument::Tag(t) => out.push_str(t),
        }
    }
    out.push_str(";\n");
}

/// Compute what `require` extensions a script's AST needs, sorted.
pub fn compute_requires(script: &Script) -> Vec<String> {
    let mut requires = BTreeSet::new();

    for cmd in &script.commands {
        if let Command::If(block) = cmd {
            collect_test_requires(&block.condition, &mut requires);
            collect_action_requires(&block.actions, &mut requires);
            for alt in &block.alternatives {
                collect_test_requires(&alt.condition, &mut requires);
                collect_action_requires(&alt.actions, &mut requires);
            }
        }
    }

    requires.into_iter().collect()
}

fn collect_test_requires(expr: &TestExpr, requires: &mut BTreeSet<String>) {
    match expr {
        TestExpr::AllOf(tests) | TestExpr::AnyOf(tests) => {
            for t in tests {
                collect_test_requires(t, requires);
            }
        }
        TestExpr::Not(inner) => collect_test_requires(inner, requires),
        TestExpr::Body { .. } => {
            requires.insert("body".to_string());
        }
        _ => {}
    }
}

fn collect_action_requires(actions: &[ActionCommand], requires: &mut BTreeSet<String>) {
    for action in actions {
        if let Some(ext) = action.action.extension() {
            requires.insert(ext.to_string());
        }
        if action
            .arguments
            .iter()
            .any(|a| matches!(a, Argument::Tag(t) if t == ":copy"))
        {
            requires.insert("copy".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::{ActionType, MatchType, SizeComparator};

    fn header(name: &str, value: &str) -> TestExpr {
        TestExpr::Header {
            match_type: MatchType::Contains,
            header_names: vec![name.to_string()],
            keys: vec![value.to_string()],
        }
    }

    fn block(name: &str, condition: TestExpr, action: ActionType, arg: Option<&str>) -> SieveBlock {
        SieveBlock {
            name: name.to_string(),
            condition,
            actions: vec![ActionCommand {
                action,
                arguments: arg
                    .map(|a| vec![Argument::QuotedString(a.to_string())])
                    .unwrap_or_default(),
            }],
        }
    }

    #[test]
    fn test_emit_chain() {
        let blocks = vec![
            block("Spam", header("Subject", "free money"), ActionType::Fileinto, Some("Junk")),
            block("Boss", header("From", "boss@x.org"), ActionType::Addflag, Some("\\Flagged")),
        ];
        let text = emit(&build_script(blocks, true));
        assert_eq!(
            text,
            r#"require ["fileinto", "imap4flags"];

# rule:[Spam]
if header :contains "Subject" "free money" {
    fileinto "Junk";
}
# rule:[Boss]
elsif header :contains "From" "boss@x.org" {
    addflag "\\Flagged";
}
"#
        );
    }

    #[test]
    fn test_emit_independent_blocks() {
        let blocks = vec![
            block("A", header("Subject", "a"), ActionType::Discard, None),
            block("B", TestExpr::True, ActionType::Stop, None),
        ];
        let text = emit(&build_script(blocks, false));
        assert_eq!(
            text,
            concat!(
                "# rule:[A]\n",
                "if header :contains \"Subject\" \"a\" {\n    discard;\n}\n",
                "\n",
                "# rule:[B]\n",
                "if true {\n    stop;\n}\n",
            )
        );
    }

    #[test]
    fn test_single_require_is_not_a_list() {
        let blocks = vec![block("A", header("Subject", "a"), ActionType::Fileinto, Some("X"))];
        let text = emit(&build_script(blocks, true));
        assert!(text.starts_with("require \"fileinto\";\n"));
    }

    #[test]
    fn test_require_is_emitted_once_before_blocks() {
        let blocks = vec![
            block("A", header("Subject", "a"), ActionType::Fileinto, Some("X")),
            block("B", header("Subject", "b"), ActionType::Fileinto, Some("Y")),
            block("C", header("Subject", "c"), ActionType::Addflag, Some("\\Seen")),
        ];
        let script = build_script(blocks, false);
        assert!(matches!(&script.commands[0], Command::Require(_)));
        let text = emit(&script);
        assert_eq!(text.matches("require ").count(), 1);
        assert!(text.starts_with("require [\"fileinto\", \"imap4flags\"];\n\n# rule:[A]\n"));
    }

    #[test]
    fn test_quotes_in_values_are_escaped() {
        let blocks = vec![block("Q", header("Subject", "say \"hi\""), ActionType::Discard, None)];
        let text = emit(&build_script(blocks, true));
        assert!(text.contains(r#"header :contains "Subject" "say \"hi\"""#));
        assert!(!text.contains("\"\"hi"));
    }

    #[test]
    fn test_compound_tests() {
        let expr = TestExpr::AllOf(vec![
            TestExpr::Not(Box::new(header("To", "me"))),
            TestExpr::Size {
                comparator: SizeComparator::Under,
                limit: "10K".to_string(),
            },
            TestExpr::Body {
                match_type: MatchType::Matches,
                keys: vec!["*x*".to_string()],
            },
        ]);
        let script = build_script(vec![block("C", expr, ActionType::Stop, None)], true);
        assert_eq!(compute_requires(&script), vec!["body"]);
        let text = emit(&script);
        assert!(text.contains(
            r#"if allof (not header :contains "To" "me", size :under 10K, body :matches "*x*") {"#
        ));
    }

    #[test]
    fn test_copy_requires_extension() {
        let mut b = block("C", TestExpr::True, ActionType::Fileinto, None);
        b.actions[0].arguments = vec![
            Argument::Tag(":copy".to_string()),
            Argument::QuotedString("Archive".to_string()),
        ];
        let script = build_script(vec![b], true);
        assert_eq!(compute_requires(&script), vec!["copy", "fileinto"]);
        assert!(emit(&script).contains("    fileinto :copy \"Archive\";\n"));
    }

    #[test]
    fn test_comments_and_rule_names_stay_single_line() {
        let mut script = build_script(
            vec![block("two\nlines", TestExpr::True, ActionType::Stop, None)],
            true,
        );
        script
            .commands
            .push(Command::Comment("skipped:\nrule:[X]".to_string()));
        let text = emit(&script);
        assert!(text.contains("# rule:[two lines]\n"));
        assert!(text.ends_with("\n# skipped:\n# rule:[X]\n"));
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(emit(&build_script(Vec::new(), true)), "");
    }
}
