//! Runner core: pure data model, report parsing, diagnostics bookkeeping and
//! the run state machine.
mod aggregate;
mod collab;
mod effect;
mod grammar;
mod model;
mod msg;
mod output;
mod parser;
mod publisher;
mod report;
mod state;
mod update;
mod view_model;

pub use aggregate::{merge, resolve_slot};
pub use collab::{
    DiagnosticSink, DocumentOpener, Notification, NotificationLevel, Notifier, OpenDocument,
};
pub use effect::Effect;
pub use grammar::{ExtractedTokens, MessageGrammar, RawLocation, SolcMessageGrammar};
pub use model::{
    is_empty_payload, Diagnostic, DiagnosticsByPath, JobSnapshot, JobStatus, Position, RunId,
    CONTRACT_FIELD,
};
pub use msg::{Msg, PollEnd};
pub use output::{
    discover_progress_url, find_status_url, job_data_url, progress_url, strip_color_codes,
    STATUS_URL_PHRASE,
};
pub use parser::{ErrorReportParser, PathResolver};
pub use publisher::{DiagnosticPublisher, FileEvent, FileEventKind};
pub use report::{ErrorReport, ReportMessage, Topic};
pub use state::{AppState, RunEntry, RunStatus};
pub use update::update;
pub use view_model::{AppViewModel, JobRowView, RunRowView};
