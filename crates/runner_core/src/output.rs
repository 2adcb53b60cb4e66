//! Text handling for the verifier's standard output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Phrase preceding the job status URL in the verifier output.
pub const STATUS_URL_PHRASE: &str = "You can follow up on the status:";

const STATUS_TOKEN: &str = "jobStatus";
const PROGRESS_TOKEN: &str = "progress";
const JOB_DATA_TOKEN: &str = "jobData";

// Real escape sequences, plus the bash spellings that show up when the tool's
// output passes through `echo` without `-e`.
static COLOR_CODES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;]*m|\\e\[[0-9;]*m|\\033\[[0-9;]*m|\\x1[bB]\[[0-9;]*m")
        .expect("valid color code regex")
});

static STATUS_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"You can follow up on the status:\s*(https?://\S+)").expect("valid status url regex")
});

pub fn strip_color_codes(text: &str) -> String {
    COLOR_CODES_RE.replace_all(text, "").into_owned()
}

/// Returns the job status URL announced in `text`, if any.
pub fn find_status_url(text: &str) -> Option<String> {
    STATUS_URL_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|candidate| candidate.contains(STATUS_TOKEN) && url::Url::parse(candidate).is_ok())
        .map(str::to_string)
}

/// Derives the poll URL from a status URL: only the `jobStatus` token changes.
pub fn progress_url(status_url: &str) -> String {
    status_url.replacen(STATUS_TOKEN, PROGRESS_TOKEN, 1)
}

/// Derives the companion job-data URL queried for the job's creation time.
pub fn job_data_url(progress_url: &str, attr: &str) -> String {
    let base = progress_url.replacen(PROGRESS_TOKEN, JOB_DATA_TOKEN, 1);
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}attr={attr}")
}

/// Progress URL announced in `text`, if any.
pub fn discover_progress_url(text: &str) -> Option<String> {
    find_status_url(text).map(|url| progress_url(&url))
}
