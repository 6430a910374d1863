// src/watch/translate.rs

//! Converting `notify` events into raw notifications.

use notify::event::{
    AccessKind, AccessMode, CreateKind, EventKind, ModifyKind, RemoveKind, RenameMode,
};
use notify::Event;

use crate::engine::event::{EventFlags, RawNotification};

/// Flags implied by one `notify` event kind.
///
/// Content/metadata modifications have no counterpart in the flag set and
/// map to empty. `RenameMode::Both` is empty too: the inotify backend already
/// reports the two halves of a rename as separate `From` and `To` events.
pub fn flags_for_kind(kind: &EventKind) -> EventFlags {
    match kind {
        EventKind::Create(CreateKind::Folder) => EventFlags::CREATED | EventFlags::IS_DIRECTORY,
        EventKind::Create(_) => EventFlags::CREATED,
        EventKind::Remove(RemoveKind::Folder) => EventFlags::DELETED | EventFlags::IS_DIRECTORY,
        EventKind::Remove(_) => EventFlags::DELETED,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => EventFlags::CLOSED_AFTER_WRITE,
        EventKind::Access(AccessKind::Close(_)) => EventFlags::CLOSED_WITHOUT_WRITE,
        EventKind::Access(AccessKind::Open(_)) => EventFlags::OPENED,
        EventKind::Access(_) => EventFlags::ACCESSED,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => EventFlags::MOVED_FROM,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => EventFlags::MOVED_TO,
        _ => EventFlags::empty(),
    }
}

/// One raw notification per path in `event`; nothing if the kind carries no
/// flags.
pub fn translate(event: &Event) -> Vec<RawNotification> {
    let flags = flags_for_kind(&event.kind);
    if flags.is_empty() {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .map(|p| RawNotification::for_entry(p, flags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut e = Event::new(kind);
        for p in paths {
            e = e.add_path(PathBuf::from(p));
        }
        e
    }

    #[test]
    fn close_write_maps_to_closed_after_write() {
        let out = translate(&event(
            EventKind::Access(AccessKind::Close(AccessMode::Write)),
            &["/w/a.txt"],
        ));
        assert_eq!(
            out,
            vec![RawNotification::new("/w", "a.txt", EventFlags::CLOSED_AFTER_WRITE)]
        );
    }

    #[test]
    fn folder_creation_carries_isdir() {
        let flags = flags_for_kind(&EventKind::Create(CreateKind::Folder));
        assert_eq!(flags, EventFlags::CREATED | EventFlags::IS_DIRECTORY);
    }

    #[test]
    fn rename_halves_map_separately() {
        assert_eq!(
            flags_for_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
            EventFlags::MOVED_FROM
        );
        assert_eq!(
            flags_for_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            EventFlags::MOVED_TO
        );
        assert!(translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/w/a", "/w/b"],
        ))
        .is_empty());
    }

    #[test]
    fn data_modification_is_dropped() {
        let out = translate(&event(
            EventKind::Modify(ModifyKind::Data(notify::event::DataChange::Content)),
            &["/w/a.txt"],
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn one_notification_per_path() {
        let out = translate(&event(
            EventKind::Remove(RemoveKind::File),
            &["/w/a", "/w/b"],
        ));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|n| n.flags == EventFlags::DELETED));
    }
}
