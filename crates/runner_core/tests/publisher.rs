use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use runner_core::{
    Diagnostic, DiagnosticPublisher, DiagnosticSink, DiagnosticsByPath, FileEvent, FileEventKind,
    Position,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SinkCall {
    Publish(PathBuf, usize),
    Clear(PathBuf),
}

#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().drain(..).collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn publish(&self, _set_name: &str, path: &Path, diagnostics: &[Diagnostic]) {
        self.calls
            .lock()
            .unwrap()
            .push(SinkCall::Publish(path.to_path_buf(), diagnostics.len()));
    }

    fn clear(&self, _set_name: &str, path: &Path) {
        self.calls
            .lock()
            .unwrap()
            .push(SinkCall::Clear(path.to_path_buf()));
    }
}

fn diagnostics(entries: &[(&str, usize)]) -> DiagnosticsByPath {
    entries
        .iter()
        .map(|(path, count)| {
            let path = PathBuf::from(path);
            let items = (0..*count)
                .map(|i| Diagnostic::at(path.clone(), Position::new(i as u32, 0), "boom"))
                .collect();
            (path, items)
        })
        .collect()
}

fn publisher() -> (DiagnosticPublisher<Arc<RecordingSink>>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (DiagnosticPublisher::new(sink.clone()), sink)
}

#[test]
fn edit_clears_only_the_edited_path() {
    let (mut publisher, sink) = publisher();
    publisher.publish(diagnostics(&[("X.sol", 3), ("Y.sol", 1)]));
    assert_eq!(
        sink.take(),
        vec![
            SinkCall::Publish(PathBuf::from("X.sol"), 3),
            SinkCall::Publish(PathBuf::from("Y.sol"), 1),
        ]
    );

    assert!(publisher.on_file_event(&FileEvent::changed("X.sol")));
    assert_eq!(sink.take(), vec![SinkCall::Clear(PathBuf::from("X.sol"))]);
    assert!(publisher.diagnostics_for(Path::new("X.sol")).is_none());
    assert_eq!(publisher.diagnostics_for(Path::new("Y.sol")).unwrap().len(), 1);
    assert!(publisher.is_watching());
}

#[test]
fn watcher_is_released_once_every_set_is_cleared() {
    let (mut publisher, _sink) = publisher();
    assert!(!publisher.is_watching());

    // Several diagnostics in one set still count as one pending path.
    publisher.publish(diagnostics(&[("X.sol", 4), ("Y.sol", 2)]));
    publisher.on_file_event(&FileEvent::changed("X.sol"));
    assert!(publisher.is_watching());
    publisher.on_file_event(&FileEvent::changed("X.sol"));
    assert!(publisher.is_watching());
    publisher.on_file_event(&FileEvent::changed("Y.sol"));
    assert!(!publisher.is_watching());
}

#[test]
fn removal_and_rename_invalidate_creation_does_not() {
    let (mut publisher, sink) = publisher();
    publisher.publish(diagnostics(&[("A.sol", 1), ("B.sol", 1)]));
    sink.take();

    assert!(!publisher.on_file_event(&FileEvent {
        kind: FileEventKind::Created,
        path: PathBuf::from("A.sol"),
    }));
    assert!(publisher.on_file_event(&FileEvent::removed("A.sol")));
    assert!(publisher.on_file_event(&FileEvent {
        kind: FileEventKind::Renamed,
        path: PathBuf::from("B.sol"),
    }));
    assert_eq!(
        sink.take(),
        vec![
            SinkCall::Clear(PathBuf::from("A.sol")),
            SinkCall::Clear(PathBuf::from("B.sol")),
        ]
    );
}

#[test]
fn reset_clears_every_set() {
    let (mut publisher, sink) = publisher();
    publisher.publish(diagnostics(&[("A.sol", 1), ("B.sol", 2)]));
    sink.take();

    publisher.reset();
    assert_eq!(
        sink.take(),
        vec![
            SinkCall::Clear(PathBuf::from("A.sol")),
            SinkCall::Clear(PathBuf::from("B.sol")),
        ]
    );
    assert_eq!(publisher.paths().count(), 0);
    assert!(!publisher.is_watching());
}

#[test]
fn republishing_a_path_replaces_its_set() {
    let (mut publisher, _sink) = publisher();
    publisher.publish(diagnostics(&[("A.sol", 1)]));
    publisher.publish(diagnostics(&[("A.sol", 3)]));

    assert_eq!(publisher.paths().count(), 1);
    assert_eq!(publisher.diagnostics_for(Path::new("A.sol")).unwrap().len(), 3);
}

#[test]
fn empty_groups_are_not_published() {
    let (mut publisher, sink) = publisher();
    let mut grouped = DiagnosticsByPath::new();
    grouped.insert(PathBuf::from("A.sol"), Vec::new());
    publisher.publish(grouped);

    assert!(sink.take().is_empty());
    assert!(!publisher.is_watching());
}
