// src/watch/event_handler.rs

//! Turning raw `notify` events into trigger decisions.

use std::path::Path;

use notify::{Event, EventKind};
use tracing::{debug, trace};

use crate::watch::path_utils::relative_str;
use crate::watch::patterns::WatchSpec;

/// Create, modify and remove events are relevant; access and
/// backend-specific "other" events are not.
pub fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// First root-relative path of `event` that `spec` matches, if any.
pub fn matching_path(root: &Path, spec: &WatchSpec, event: &Event) -> Option<String> {
    if !is_relevant(&event.kind) {
        trace!(kind = ?event.kind, "ignoring irrelevant event kind");
        return None;
    }

    for path in &event.paths {
        let Some(rel) = relative_str(root, path) else {
            debug!(?path, ?root, "could not relativize event path");
            continue;
        };
        if spec.matches(&rel) {
            return Some(rel);
        }
        trace!(rel = %rel, "event path does not match watch spec");
    }

    None
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    use super::*;

    fn spec() -> WatchSpec {
        WatchSpec::new(&["src/*.ext".to_string()], &[]).unwrap()
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn create_modify_remove_match() {
        let root = PathBuf::from("/project");
        for kind in [
            EventKind::Create(CreateKind::File),
            EventKind::Modify(ModifyKind::Any),
            EventKind::Remove(RemoveKind::File),
        ] {
            let ev = event(kind, "/project/src/a.ext");
            assert_eq!(
                matching_path(&root, &spec(), &ev).as_deref(),
                Some("src/a.ext")
            );
        }
    }

    #[test]
    fn access_events_are_ignored() {
        let root = PathBuf::from("/project");
        let ev = event(EventKind::Access(AccessKind::Any), "/project/src/a.ext");
        assert_eq!(matching_path(&root, &spec(), &ev), None);
    }

    #[test]
    fn non_matching_paths_are_ignored() {
        let root = PathBuf::from("/project");
        let ev = event(
            EventKind::Modify(ModifyKind::Any),
            "/project/src/nested/a.ext",
        );
        assert_eq!(matching_path(&root, &spec(), &ev), None);
    }

    #[test]
    fn rename_picks_matching_side() {
        let root = PathBuf::from("/project");
        let ev = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/project/src/a.tmp"))
            .add_path(PathBuf::from("/project/src/a.ext"));
        assert_eq!(
            matching_path(&root, &spec(), &ev).as_deref(),
            Some("src/a.ext")
        );
    }
}
