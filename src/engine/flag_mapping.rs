// src/engine/flag_mapping.rs

//! Flag-to-message table.
//!
//! Each rule is checked on its own against the flag set, so one notification
//! can produce several messages. Output follows table order.

use crate::engine::event::{EventFlags, LocalNotice, MessageKind, SemanticMessage};

/// Result of one matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapped {
    Publish(SemanticMessage),
    Notice(LocalNotice),
}

struct Rule {
    applies: fn(EventFlags) -> bool,
    produce: fn(&str) -> Mapped,
}

fn publish(kind: MessageKind, topic: &str, body: String) -> Mapped {
    Mapped::Publish(SemanticMessage::text(kind, topic, body))
}

const RULES: [Rule; 8] = [
    Rule {
        applies: |f| f.contains(EventFlags::CREATED),
        produce: |t| publish(MessageKind::FileCreated, t, format!("New File {t} has been Created")),
    },
    Rule {
        applies: |f| f.contains(EventFlags::CLOSED_AFTER_WRITE),
        produce: |t| {
            publish(MessageKind::FileModifiedClosed, t, format!("File {t} is modified and closed"))
        },
    },
    Rule {
        applies: |f| f.contains(EventFlags::OPENED | EventFlags::CLOSED_WITHOUT_WRITE),
        produce: |t| publish(MessageKind::FileUnmodified, t, format!("File {t} not modified")),
    },
    Rule {
        applies: |f| {
            f.contains(EventFlags::OPENED) && !f.contains(EventFlags::CLOSED_WITHOUT_WRITE)
        },
        produce: |t| Mapped::Notice(LocalNotice::FileOpened { path: t.to_string() }),
    },
    Rule {
        applies: |f| f.contains(EventFlags::DELETED),
        produce: |t| publish(MessageKind::FileDeleted, t, format!("File {t} is Deleted")),
    },
    Rule {
        applies: |f| f.contains(EventFlags::MOVED_FROM),
        produce: |t| publish(MessageKind::FileMovedFrom, t, format!("File is Moved from {t}")),
    },
    Rule {
        applies: |f| f.contains(EventFlags::MOVED_TO),
        produce: |t| publish(MessageKind::FileMovedTo, t, format!("File is Moved to {t}")),
    },
    Rule {
        applies: |f| f.intersects(EventFlags::ACCESSED | EventFlags::IS_DIRECTORY),
        produce: |t| publish(MessageKind::FileOpened, t, format!("Opened {t}")),
    },
];

/// Everything the table produces for `flags` on `topic`.
pub fn map_flags(flags: EventFlags, topic: &str) -> Vec<Mapped> {
    RULES
        .iter()
        .filter(|rule| (rule.applies)(flags))
        .map(|rule| (rule.produce)(topic))
        .collect()
}
