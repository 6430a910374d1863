// tests/classifier_properties.rs

use std::num::NonZeroUsize;
use std::sync::Arc;

use proptest::prelude::*;

use mqttwatch::engine::{
    ClassifierSettings, EventClassifier, EventFlags, ExclusionFilter, MessageKind,
    RawNotification,
};
use mqttwatch::fs::mock::MockFileSystem;
use mqttwatch::types::WatchTarget;

fn flags_strategy() -> impl Strategy<Value = EventFlags> {
    any::<u32>().prop_map(EventFlags::from_bits_truncate)
}

fn classifier(fs: MockFileSystem, threshold: u64, chunk: usize) -> EventClassifier {
    EventClassifier::new(
        Arc::new(fs),
        WatchTarget::directory_tree("/w"),
        ExclusionFilter::none(),
        ClassifierSettings {
            large_file_threshold: threshold,
            chunk_size: NonZeroUsize::new(chunk).unwrap(),
        },
    )
}

/// Kinds the flag table produces for a small or missing entry.
fn expected_kinds(f: EventFlags) -> Vec<MessageKind> {
    let mut out = Vec::new();
    if f.contains(EventFlags::CREATED) {
        out.push(MessageKind::FileCreated);
    }
    if f.contains(EventFlags::CLOSED_AFTER_WRITE) {
        out.push(MessageKind::FileModifiedClosed);
    }
    if f.contains(EventFlags::OPENED | EventFlags::CLOSED_WITHOUT_WRITE) {
        out.push(MessageKind::FileUnmodified);
    }
    if f.contains(EventFlags::DELETED) {
        out.push(MessageKind::FileDeleted);
    }
    if f.contains(EventFlags::MOVED_FROM) {
        out.push(MessageKind::FileMovedFrom);
    }
    if f.contains(EventFlags::MOVED_TO) {
        out.push(MessageKind::FileMovedTo);
    }
    if f.intersects(EventFlags::ACCESSED | EventFlags::IS_DIRECTORY) {
        out.push(MessageKind::FileOpened);
    }
    out
}

proptest! {
    #[test]
    fn small_file_messages_follow_table_order(flags in flags_strategy(), len in 0usize..64) {
        let fs = MockFileSystem::new();
        fs.add_file("/w/f", vec![7u8; len]);
        let mut c = classifier(fs, 64, 8);

        let msgs = c.classify_to_vec(&RawNotification::new("/w", "f", flags)).unwrap();
        let kinds: Vec<MessageKind> = msgs.iter().map(|m| m.kind).collect();
        prop_assert_eq!(kinds, expected_kinds(flags));
        prop_assert!(msgs.iter().all(|m| m.topic == "/w/f"));
    }

    #[test]
    fn large_file_chunk_count_ignores_flags(
        flags in flags_strategy(),
        len in 65usize..600,
        chunk in 1usize..100,
    ) {
        let fs = MockFileSystem::new();
        let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
        fs.add_file("/w/big", data.clone());
        let mut c = classifier(fs, 64, chunk);

        let msgs = c.classify_to_vec(&RawNotification::new("/w", "big", flags)).unwrap();
        prop_assert_eq!(msgs.len(), len.div_ceil(chunk));
        for (i, m) in msgs.iter().enumerate() {
            prop_assert_eq!(&m.topic, &format!("/w/big/chunk_{}", i + 1));
        }
        let joined: Vec<u8> = msgs.iter().flat_map(|m| m.payload.as_bytes().to_vec()).collect();
        prop_assert_eq!(joined, data);
    }
}
