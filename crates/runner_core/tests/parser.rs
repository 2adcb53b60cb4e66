use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use runner_core::{
    Diagnostic, ErrorReport, ErrorReportParser, PathResolver, Position, ReportMessage, Topic,
};

const LOG: &str = "/ws/certora-logs/run.conf-1700000000000.log";

fn report(messages: &[&str]) -> ErrorReport {
    ErrorReport {
        topics: vec![Topic {
            name: "Compilation".to_string(),
            messages: messages
                .iter()
                .map(|m| ReportMessage {
                    message: m.to_string(),
                    location: None,
                })
                .collect(),
        }],
    }
}

/// Resolves only the paths it was given, under `/ws`.
struct KnownFiles(Vec<&'static str>);

impl PathResolver for KnownFiles {
    fn resolve(&self, raw: &str) -> Option<PathBuf> {
        self.0
            .iter()
            .find(|known| **known == raw)
            .map(|known| Path::new("/ws").join(known))
    }
}

#[test]
fn solc_message_yields_zero_based_position_and_clean_text() {
    let parser = ErrorReportParser::default();
    let resolver = KnownFiles(vec!["BankLesson/Bank.sol"]);
    let parsed = parser.parse(
        &report(&["BankLesson/Bank.sol:22:5: ParserError: Expected ';' but got 'function'"]),
        &resolver,
        Path::new(LOG),
    );

    let path = PathBuf::from("/ws/BankLesson/Bank.sol");
    assert_eq!(
        parsed.get(&path).unwrap(),
        &vec![Diagnostic::at(
            path.clone(),
            Position::new(21, 4),
            "ParserError: Expected ';' but got 'function'",
        )]
    );
}

#[test]
fn unresolved_path_falls_back_to_log_at_origin() {
    let parser = ErrorReportParser::default();
    let resolver = KnownFiles(vec![]);
    let parsed = parser.parse(
        &report(&["Missing/Gone.sol:10:3: DeclarationError: Undeclared identifier."]),
        &resolver,
        Path::new(LOG),
    );

    let diagnostics = parsed.get(Path::new(LOG)).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].start, Position::ORIGIN);
    assert_eq!(diagnostics[0].end, Position::ORIGIN);
    assert_eq!(
        diagnostics[0].message,
        "DeclarationError: Undeclared identifier."
    );
}

#[test]
fn message_without_tokens_is_attributed_to_log() {
    let parser = ErrorReportParser::default();
    let resolver = |_: &str| -> Option<PathBuf> { None };
    let parsed = parser.parse(
        &report(&["Prover failed to start ()"]),
        &resolver,
        Path::new(LOG),
    );

    let diagnostics = parsed.get(Path::new(LOG)).unwrap();
    assert_eq!(diagnostics[0].message, "Prover failed to start");
}

#[test]
fn resolved_path_without_location_defaults_to_origin() {
    let parser = ErrorReportParser::default();
    let resolver = KnownFiles(vec!["specs/Bank.spec"]);
    let parsed = parser.parse(
        &report(&["Could not type check specs/Bank.spec"]),
        &resolver,
        Path::new(LOG),
    );

    let diagnostics = parsed.get(Path::new("/ws/specs/Bank.spec")).unwrap();
    assert_eq!(diagnostics[0].start, Position::ORIGIN);
    assert_eq!(diagnostics[0].message, "Could not type check");
}

#[test]
fn messages_are_grouped_by_path_in_report_order() {
    let parser = ErrorReportParser::default();
    let resolver = KnownFiles(vec!["a/A.sol", "b/B.sol"]);
    let parsed = parser.parse(
        &report(&[
            "a/A.sol:1:1: first",
            "b/B.sol:2:2: second",
            "a/A.sol:3:3: third",
        ]),
        &resolver,
        Path::new(LOG),
    );

    assert_eq!(parsed.len(), 2);
    let a: Vec<_> = parsed[Path::new("/ws/a/A.sol")]
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(a, vec!["first", "third"]);
    assert_eq!(parsed[Path::new("/ws/b/B.sol")][0].start, Position::new(1, 1));
}

#[test]
fn location_field_is_used_when_message_has_no_reference() {
    let parser = ErrorReportParser::default();
    let resolver = KnownFiles(vec!["certora/Bank.spec"]);
    let report = ErrorReport {
        topics: vec![Topic {
            name: "Type checking".to_string(),
            messages: vec![ReportMessage {
                message: "unknown variable balance".to_string(),
                location: Some("certora/Bank.spec:7:12".to_string()),
            }],
        }],
    };

    let parsed = parser.parse(&report, &resolver, Path::new(LOG));
    let diagnostics = &parsed[Path::new("/ws/certora/Bank.spec")];
    assert_eq!(diagnostics[0].start, Position::new(6, 11));
    assert_eq!(diagnostics[0].message, "unknown variable balance");
}

#[test]
fn malformed_report_is_empty() {
    assert!(ErrorReport::from_json("{ not json").is_err());
    let report = ErrorReport::default();
    assert!(report.is_empty());

    let parser = ErrorReportParser::default();
    let resolver = KnownFiles(vec![]);
    assert!(parser.parse(&report, &resolver, Path::new(LOG)).is_empty());
}

#[test]
fn report_schema_decodes() {
    let text = r#"{"topics":[{"name":"Syntax","messages":[{"message":"x.sol:1:2: boom"},{"message":"y","location":"y.spec:3:4"}]}]}"#;
    let report = ErrorReport::from_json(text).unwrap();
    assert_eq!(report.topics[0].name, "Syntax");
    assert_eq!(report.messages().count(), 2);
    assert_eq!(
        report.topics[0].messages[1].location.as_deref(),
        Some("y.spec:3:4")
    );
}
