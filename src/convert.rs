//! Parse → map → emit pipeline.
use std::path::Path;

use tracing::{debug, warn};

use crate::config::options::ConvertOptions;
use crate::error::{Error, QuoteWarning, Result, RuleError};
use crate::model::rule::Rule;
use crate::sieve::ast::Command;
use crate::sieve::{converter, emitter};
use crate::store::script_io;
use crate::thunderbird::parser;

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRule {
    /// Zero-based position of the rule in the input file.
    pub index: usize,
    pub name: String,
    pub reason: RuleError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    pub total: usize,
    pub converted: Vec<String>,
    pub skipped: Vec<SkippedRule>,
    pub warnings: Vec<QuoteWarning>,
}

/// A finished conversion. The script stays in memory so a failed write can
/// be retried.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub script: String,
    pub report: ConversionReport,
}

impl Conversion {
    pub fn write_to(&self, path: &Path) -> Result<()> {
        script_io::save_script(path, &self.script)
    }
}

/// Reads and converts a filter file. Nothing is written.
pub fn convert_file(input: &Path, options: &ConvertOptions) -> Result<Conversion> {
    let text = script_io::load_filters(input)?;
    let rules = parser::parse(&text).rules;
    if rules.is_empty() {
        return Err(Error::EmptyInput {
            path: input.to_path_buf(),
        });
    }
    Ok(convert_rules(rules, options))
}

/// Converts rules in order. Rules that cannot be expressed in SIEVE are
/// reported and left out; every input rule ends up either converted or
/// skipped.
pub fn convert_rules(rules: Vec<Rule>, options: &ConvertOptions) -> Conversion {
    let mut report = ConversionReport {
        total: rules.len(),
        ..Default::default()
    };
    let mut blocks = Vec::new();

    for (index, rule) in rules.into_iter().enumerate() {
        match converter::rule_to_block(&rule, options) {
            Ok(mapped) => {
                debug!(rule = %rule.name, "converted");
                for w in &mapped.warnings {
                    warn!(
                        rule = %w.rule,
                        field = %w.field,
                        "quotes sanitized: {:?} -> {:?}, please check the result",
                        w.original,
                        w.sanitized
                    );
                }
                report.warnings.extend(mapped.warnings);
                report.converted.push(rule.name);
                blocks.push(mapped.block);
            }
            Err(reason) => {
                warn!(rule = %rule.name, index, "skipped: {reason}");
                report.skipped.push(SkippedRule {
                    index,
                    name: rule.name,
                    reason,
                });
            }
        }
    }

    if blocks.is_empty() {
        warn!("none of {} rules could be converted, the script has no active rules", report.total);
    }
    let mut script = emitter::build_script(blocks, options.chain);
    if options.comment_skipped {
        for skipped in &report.skipped {
            script.commands.push(Command::Comment(format!(
                "skipped rule:[{}] {}",
                skipped.name.replace(['\r', '\n'], " "),
                skipped.reason
            )));
        }
    }

    Conversion {
        script: emitter::emit(&script),
        report,
    }
}
