use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;

use super::debouncer::{DEBOUNCE_MS, Debouncer, is_temp_file};
use super::router::route_changes;
use super::types::ChangeKind;
use crate::config::test_parse_config;
use crate::registry::{Registry, RouteKey, RouteKind};

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn registry() -> Registry {
    Registry::from_config(&test_parse_config("")).unwrap()
}

fn changes(entries: &[(&str, ChangeKind)]) -> FxHashMap<PathBuf, ChangeKind> {
    entries
        .iter()
        .map(|(path, kind)| (PathBuf::from(path), *kind))
        .collect()
}

// ----------------------------------------------------------------------------
// debouncer
// ----------------------------------------------------------------------------

#[test]
fn test_debouncer_empty() {
    let mut debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
    assert!(debouncer.take_if_ready().is_none());
    assert_eq!(debouncer.sleep_duration(), Duration::from_secs(86400));
}

#[test]
fn test_event_kinds() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.scss"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.scss"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/c.scss"], remove_kind()));

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(debouncer.changes[Path::new("/tmp/a.scss")], ChangeKind::Created);
    assert_eq!(debouncer.changes[Path::new("/tmp/b.scss")], ChangeKind::Modified);
    assert_eq!(debouncer.changes[Path::new("/tmp/c.scss")], ChangeKind::Removed);
}

#[test]
fn test_metadata_only_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.scss"], metadata_kind()));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_files_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(
        vec!["/tmp/.main.scss.swp", "/tmp/main.scss~", "/tmp/x.bak"],
        modify_kind(),
    ));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());

    assert!(is_temp_file(Path::new("/tmp/item.js___jb_tmp___")));
    assert!(!is_temp_file(Path::new("/tmp/item.js")));
}

#[test]
fn test_dedup_first_event_wins() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js", "/tmp/a.js"], modify_kind()));

    assert_eq!(debouncer.changes.len(), 1);
    assert_eq!(debouncer.changes[Path::new("/tmp/a.js")], ChangeKind::Created);
}

#[test]
fn test_remove_then_create_restores() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], create_kind()));
    assert_eq!(debouncer.changes[Path::new("/tmp/a.js")], ChangeKind::Created);
}

#[test]
fn test_modify_then_remove_upgrades() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], remove_kind()));
    assert_eq!(debouncer.changes[Path::new("/tmp/a.js")], ChangeKind::Removed);
}

#[test]
fn test_create_then_remove_discards() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], remove_kind()));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_quiet_window() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], modify_kind()));

    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));

    std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 20));
    let taken = debouncer.take_if_ready().unwrap();
    assert_eq!(taken.len(), 1);
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

// ----------------------------------------------------------------------------
// router
// ----------------------------------------------------------------------------

#[test]
fn test_item_script_change_routes_to_item_script_only() {
    let keys = route_changes(
        changes(&[("/site/src/item/js/item.js", ChangeKind::Modified)]),
        Path::new("/site"),
        &registry(),
    );
    assert_eq!(keys, [RouteKey::new("item", RouteKind::Script)]);
}

#[test]
fn test_multiple_changes_dedup_and_sort() {
    let keys = route_changes(
        changes(&[
            ("/site/src/item/js/item.js", ChangeKind::Modified),
            ("/site/src/item/js/other.js", ChangeKind::Created),
            ("/site/src/docs/scss/main.scss", ChangeKind::Modified),
        ]),
        Path::new("/site"),
        &registry(),
    );
    assert_eq!(
        keys,
        [
            RouteKey::new("docs", RouteKind::Style),
            RouteKey::new("item", RouteKind::Script),
        ]
    );
}

#[test]
fn test_removed_files_trigger_nothing() {
    let keys = route_changes(
        changes(&[("/site/src/item/js/item.js", ChangeKind::Removed)]),
        Path::new("/site"),
        &registry(),
    );
    assert!(keys.is_empty());
}

#[test]
fn test_paths_outside_root_ignored() {
    let keys = route_changes(
        changes(&[("/elsewhere/src/item/js/item.js", ChangeKind::Modified)]),
        Path::new("/site"),
        &registry(),
    );
    assert!(keys.is_empty());
}

#[test]
fn test_output_writes_do_not_loop() {
    let keys = route_changes(
        changes(&[
            ("/site/build/item/js/item.js", ChangeKind::Created),
            ("/site/build/item/css/main.css", ChangeKind::Modified),
        ]),
        Path::new("/site"),
        &registry(),
    );
    assert!(keys.is_empty());
}
