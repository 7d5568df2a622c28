use bytes::Bytes;
use pocketboss::upload::{UploadEvent, UploadFile, UploadSession, UploadStatus};

fn individual(name: &str, size: usize) -> UploadFile {
    UploadFile::from_bytes(name, Bytes::from(vec![0u8; size]))
}

fn folder_file(path: &str) -> UploadFile {
    UploadFile::from_relative(path, Bytes::from(path.to_string()))
}

fn event(name: &str, path: &str, progress: u8, status: UploadStatus) -> UploadEvent {
    UploadEvent {
        index: 0,
        name: name.to_string(),
        path: path.to_string(),
        progress,
        status,
        file_id: None,
        error: None,
    }
}

#[test]
fn test_report_and_specs_folder_scenario() {
    let mut session = UploadSession::new("p1");
    session.add_files(vec![individual("report.pdf", 2 * 1024 * 1024)]);
    session.add_folder(vec![folder_file("Specs/a.dwg"), folder_file("Specs/b.tiff")]);

    let summary = session.summary();
    assert_eq!(summary.individual_files, 1);
    assert_eq!(summary.folders, 1);
    assert_eq!(summary.nested_files, 2);

    let order: Vec<String> = session
        .queued()
        .iter()
        .map(|(f, path)| {
            if path.is_empty() {
                f.name.clone()
            } else {
                format!("{path}/{}", f.name)
            }
        })
        .collect();
    assert_eq!(order, vec!["report.pdf", "Specs/a.dwg", "Specs/b.tiff"]);

    assert_eq!(session.items().len(), 3);
    assert!(session
        .items()
        .iter()
        .all(|i| i.status == UploadStatus::Pending && i.progress == 0));
}

#[test]
fn test_selections_accumulate_across_picks() {
    let mut session = UploadSession::new("p1");
    session.add_folder(vec![folder_file("Specs/a.dwg")]);
    session.add_folder(vec![folder_file("Specs/b.tiff")]);
    session.add_folder(vec![folder_file("Photos/site.jpg")]);
    session.add_files(vec![individual("one.pdf", 1)]);
    session.add_files(vec![individual("two.pdf", 1)]);

    let summary = session.summary();
    assert_eq!(summary.individual_files, 2);
    assert_eq!(summary.folders, 2);
    assert_eq!(summary.nested_files, 3);
}

#[test]
fn test_same_name_individual_file_replaces_earlier_pick() {
    let mut session = UploadSession::new("p1");
    session.add_files(vec![individual("report.pdf", 1)]);
    session.add_files(vec![individual("report.pdf", 5)]);

    assert_eq!(session.individual_files().len(), 1);
    assert_eq!(session.individual_files()[0].size, 5);
}

#[test]
fn test_removals() {
    let mut session = UploadSession::new("p1");
    session.add_files(vec![individual("report.pdf", 1), individual("notes.txt", 1)]);
    session.add_folder(vec![
        folder_file("Specs/a.dwg"),
        folder_file("Specs/b.tiff"),
        folder_file("Specs/old/c.txt"),
    ]);

    assert!(session.remove_file("notes.txt"));
    assert!(!session.remove_file("notes.txt"));

    assert!(session.remove_folder_file("Specs", "b.tiff"));
    assert!(session.remove_folder("Specs/old"));
    assert!(!session.remove_folder("Specs/old"));

    assert_eq!(session.items().len(), 2);
    assert_eq!(session.summary().nested_files, 1);

    assert!(session.remove_folder("Specs"));
    assert!(session.folder().is_none());
    assert_eq!(session.summary().folders, 0);
}

#[test]
fn test_apply_never_lowers_progress() {
    let mut session = UploadSession::new("p1");
    session.add_folder(vec![folder_file("Specs/a.dwg")]);

    session.apply(&event("a.dwg", "Specs", 70, UploadStatus::Uploading));
    session.apply(&event("a.dwg", "Specs", 10, UploadStatus::Error));

    let item = session.item("Specs", "a.dwg").unwrap();
    assert_eq!(item.progress, 70);
    assert_eq!(item.status, UploadStatus::Error);
}

#[test]
fn test_item_state_survives_later_picks() {
    let mut session = UploadSession::new("p1");
    session.add_files(vec![individual("report.pdf", 1)]);
    session.apply(&event("report.pdf", "", 40, UploadStatus::Uploading));

    session.add_folder(vec![folder_file("Specs/a.dwg")]);

    let item = session.item("", "report.pdf").unwrap();
    assert_eq!(item.progress, 40);
}

#[test]
fn test_clear_empties_everything() {
    let mut session = UploadSession::new("p1");
    session.add_files(vec![individual("report.pdf", 1)]);
    session.add_folder(vec![folder_file("Specs/a.dwg")]);

    session.clear();

    assert!(session.is_empty());
    assert!(session.items().is_empty());
    assert_eq!(session.project_id(), "p1");
}

#[test]
fn test_same_name_at_root_gets_distinct_items() {
    let mut session = UploadSession::new("p1");
    session.add_files(vec![individual("report.pdf", 1)]);
    // A folder pick without relative paths lands at the root, next to the individual file
    session.add_folder(vec![individual("report.pdf", 2)]);

    let items = session.items();
    assert_eq!(items.len(), 2);
    assert_ne!(items[0].id, items[1].id);

    let mut done = event("report.pdf", "", 100, UploadStatus::Completed);
    done.index = 1;
    session.apply(&done);

    let states: Vec<(UploadStatus, u8)> = session
        .items()
        .iter()
        .map(|i| (i.status, i.progress))
        .collect();
    assert_eq!(
        states,
        vec![(UploadStatus::Pending, 0), (UploadStatus::Completed, 100)]
    );

    // Later picks keep both items apart
    session.add_folder(vec![folder_file("Specs/a.dwg")]);
    let items = session.items();
    assert_eq!(items.len(), 3);
    assert_ne!(items[0].id, items[1].id);
    assert_eq!(items[1].status, UploadStatus::Completed);
}

#[test]
fn test_event_for_mismatched_position_is_ignored() {
    let mut session = UploadSession::new("p1");
    session.add_files(vec![individual("report.pdf", 1)]);

    let mut stray = event("report.pdf", "", 50, UploadStatus::Uploading);
    stray.index = 3;
    session.apply(&stray);

    assert_eq!(session.items()[0].progress, 0);
    assert_eq!(session.items()[0].status, UploadStatus::Pending);
}
