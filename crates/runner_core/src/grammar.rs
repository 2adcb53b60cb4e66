//! Message grammar: how file and location references are spelled inside the
//! verifier's free-text error messages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Artifact the verifier leaves behind when an empty detail is formatted.
const EMPTY_DETAIL_ARTIFACT: &str = " ()";

static PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\b[A-Za-z]:[/\\])?(?:[\w.\-]*[/\\])*[\w\-]+\.[A-Za-z]\w*").expect("valid path regex")
});

static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(\d+):(\d+):?").expect("valid location regex"));

/// One-based location as written in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLocation {
    pub token: String,
    pub row: u32,
    pub col: u32,
}

/// Tokens pulled out of a single message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedTokens {
    pub path: Option<String>,
    pub location: Option<RawLocation>,
}

pub trait MessageGrammar: Send + Sync {
    fn extract_path(&self, text: &str) -> Option<String>;

    fn extract_location(&self, text: &str) -> Option<RawLocation>;

    /// Message with every extracted token and known artifact removed.
    fn display_message(&self, raw: &str, tokens: &ExtractedTokens) -> String;

    fn extract(&self, text: &str) -> ExtractedTokens {
        ExtractedTokens {
            path: self.extract_path(text),
            location: self.extract_location(text),
        }
    }
}

/// Grammar for solc-style `path/File.sol:row:col: Kind: text` messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct SolcMessageGrammar;

impl MessageGrammar for SolcMessageGrammar {
    fn extract_path(&self, text: &str) -> Option<String> {
        PATH_RE.find(text).map(|m| m.as_str().to_string())
    }

    fn extract_location(&self, text: &str) -> Option<RawLocation> {
        let caps = LOCATION_RE.captures(text)?;
        let row = caps.get(1)?.as_str().parse().ok()?;
        let col = caps.get(2)?.as_str().parse().ok()?;
        Some(RawLocation {
            token: caps.get(0)?.as_str().to_string(),
            row,
            col,
        })
    }

    fn display_message(&self, raw: &str, tokens: &ExtractedTokens) -> String {
        let mut message = raw.to_string();
        if let Some(path) = tokens.path.as_deref() {
            message = message.replacen(path, "", 1);
        }
        if let Some(location) = tokens.location.as_ref() {
            message = message.replacen(&location.token, "", 1);
        }
        message = message.replace(EMPTY_DETAIL_ARTIFACT, "");
        message.trim().to_string()
    }
}
