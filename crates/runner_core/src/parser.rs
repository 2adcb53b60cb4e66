//! Turns an error report into source-located diagnostics.

use std::path::{Path, PathBuf};

use crate::grammar::{ExtractedTokens, MessageGrammar, SolcMessageGrammar};
use crate::model::{Diagnostic, DiagnosticsByPath, Position};
use crate::report::{ErrorReport, ReportMessage};

/// Maps a path token from a message to a file that exists.
pub trait PathResolver {
    fn resolve(&self, raw: &str) -> Option<PathBuf>;
}

impl<F> PathResolver for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn resolve(&self, raw: &str) -> Option<PathBuf> {
        self(raw)
    }
}

pub struct ErrorReportParser<G = SolcMessageGrammar> {
    grammar: G,
}

impl Default for ErrorReportParser<SolcMessageGrammar> {
    fn default() -> Self {
        Self::new(SolcMessageGrammar)
    }
}

impl<G: MessageGrammar> ErrorReportParser<G> {
    pub fn new(grammar: G) -> Self {
        Self { grammar }
    }

    /// Parses every message of `report`. Messages whose path cannot be resolved
    /// are attributed to `log_path` at the origin.
    pub fn parse(
        &self,
        report: &ErrorReport,
        resolver: &dyn PathResolver,
        log_path: &Path,
    ) -> DiagnosticsByPath {
        let mut grouped = DiagnosticsByPath::new();
        for entry in report.messages() {
            let diagnostic = self.parse_message(entry, resolver, log_path);
            grouped
                .entry(diagnostic.path.clone())
                .or_default()
                .push(diagnostic);
        }
        grouped
    }

    pub fn parse_message(
        &self,
        entry: &ReportMessage,
        resolver: &dyn PathResolver,
        log_path: &Path,
    ) -> Diagnostic {
        let tokens = self.tokens_for(entry);
        let message = self.grammar.display_message(&entry.message, &tokens);

        let resolved = tokens.path.as_deref().and_then(|raw| resolver.resolve(raw));
        match resolved {
            Some(path) => {
                let position = tokens
                    .location
                    .as_ref()
                    .map(|loc| Position::from_one_based(loc.row, loc.col))
                    .unwrap_or(Position::ORIGIN);
                Diagnostic::at(path, position, message)
            }
            // Row/col of the original message do not correspond to lines in the log.
            None => Diagnostic::at(log_path.to_path_buf(), Position::ORIGIN, message),
        }
    }

    fn tokens_for(&self, entry: &ReportMessage) -> ExtractedTokens {
        let mut tokens = self.grammar.extract(&entry.message);
        if let Some(location) = entry.location.as_deref() {
            let fallback = self.grammar.extract(location);
            if tokens.path.is_none() {
                tokens.path = fallback.path;
            }
            if tokens.location.is_none() {
                tokens.location = fallback.location;
            }
        }
        tokens
    }
}
