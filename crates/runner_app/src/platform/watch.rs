use std::path::Path;
use std::sync::mpsc;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use runner_core::{FileEvent, FileEventKind};
use runner_logging::runner_warn;

/// Recursive watcher on the workspace, alive only while diagnostics are pending.
pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<notify::Result<Event>>,
}

impl WorkspaceWatcher {
    pub fn start(root: &Path) -> notify::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// File events received since the last call.
    pub fn drain(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            match result {
                Ok(event) => events.extend(map_event(event)),
                Err(err) => runner_warn!("File watcher error: {}", err),
            }
        }
        events
    }
}

fn map_event(event: Event) -> Vec<FileEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => FileEventKind::Created,
        EventKind::Modify(ModifyKind::Name(_)) => FileEventKind::Renamed,
        EventKind::Modify(_) => FileEventKind::Changed,
        EventKind::Remove(_) => FileEventKind::Removed,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
    };
    event
        .paths
        .into_iter()
        .map(|path| FileEvent { kind, path })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RenameMode};
    use std::path::PathBuf;

    #[test]
    fn maps_notify_kinds() {
        let path = PathBuf::from("/ws/Bank.sol");
        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(path.clone());
        assert_eq!(map_event(modify), vec![FileEvent::changed(path.clone())]);

        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
            .add_path(path.clone());
        assert_eq!(map_event(rename)[0].kind, FileEventKind::Renamed);

        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        assert_eq!(map_event(create)[0].kind, FileEventKind::Created);

        let access = Event::new(EventKind::Access(AccessKind::Any)).add_path(path);
        assert!(map_event(access).is_empty());
    }
}
