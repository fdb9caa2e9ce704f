//! Integration tests for the editor store

use serde_json::json;
use std::sync::Arc;
use strata_editor::upload::{upload_cover_image, upload_image};
use strata_editor::{
    Action, ActionError, DispatchOutcome, Editor, EditorConfig, UploadError, UploadFile, Uploader,
    COVER_ERROR_KEY, COVER_IMAGE_KEY,
};
use strata_model::{Attributes, ContainerNode, Position, TextNode};

fn single_paragraph() -> Editor {
    let doc = json!({
        "id": "root",
        "type": "container",
        "children": [
            { "id": "p1", "type": "p", "content": "Hello" }
        ]
    });
    Editor::from_json(&doc.to_string(), EditorConfig::default()).unwrap()
}

#[test]
fn test_insert_after_appends_history() {
    let mut editor = single_paragraph();

    let outcome = editor.dispatch(Action::insert(
        TextNode::paragraph("p2", "World"),
        "p1",
        Position::After,
    ));

    assert_eq!(outcome, DispatchOutcome::Committed { history_index: 1 });
    let ids: Vec<&str> = editor.container().children.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
    assert_eq!(editor.state().history_index(), 1);
}

#[test]
fn test_delete_missing_is_reference_identical() {
    let mut editor = single_paragraph();
    let before = Arc::clone(editor.container());
    let history_len = editor.state().history().len();

    editor.dispatch(Action::delete("missing"));

    assert!(Arc::ptr_eq(&before, editor.container()));
    assert_eq!(editor.state().history().len(), history_len);
}

#[test]
fn test_delete_root_is_ignored() {
    let mut editor = single_paragraph();
    let outcome = editor.dispatch(Action::delete("root"));
    assert!(matches!(outcome, DispatchOutcome::Ignored(ActionError::InvalidTarget(_))));
    assert_eq!(editor.state().history().len(), 1);
}

#[test]
fn test_two_attribute_updates_on_image() {
    let doc = ContainerNode::new("root").with_child(
        TextNode::new("img1", strata_model::BlockKind::Image)
            .with_attributes(Attributes::new().with_alt("cat")),
    );
    let mut editor = Editor::new(doc, EditorConfig::default()).unwrap();

    editor.dispatch(Action::merge_attributes("img1", Attributes::new().with_loading(true)));
    editor.dispatch(Action::merge_attributes(
        "img1",
        Attributes::new().with_loading(false).with_src("https://cdn/cat.png"),
    ));

    assert_eq!(editor.state().history().len(), 3);
    let attrs = editor.container().find("img1").unwrap().attributes();
    assert_eq!(attrs.loading, Some(false));
    assert_eq!(attrs.src.as_deref(), Some("https://cdn/cat.png"));
    assert_eq!(attrs.alt.as_deref(), Some("cat"));
}

#[test]
fn test_undo_redo_restore_snapshots() {
    let mut editor = single_paragraph();
    let first = Arc::clone(editor.container());

    editor.dispatch(Action::update_content("p1", "Hello there"));
    let second = Arc::clone(editor.container());

    assert_eq!(editor.dispatch(Action::Undo), DispatchOutcome::Moved { history_index: 0 });
    assert!(Arc::ptr_eq(&first, editor.container()));

    assert_eq!(editor.dispatch(Action::Redo), DispatchOutcome::Moved { history_index: 1 });
    assert!(Arc::ptr_eq(&second, editor.container()));
}

#[test]
fn test_undo_redo_at_boundaries_are_noops() {
    let mut editor = single_paragraph();
    assert!(matches!(
        editor.dispatch(Action::Undo),
        DispatchOutcome::Ignored(ActionError::HistoryBoundary(_))
    ));

    editor.dispatch(Action::update_content("p1", "x"));
    assert!(matches!(
        editor.dispatch(Action::Redo),
        DispatchOutcome::Ignored(ActionError::HistoryBoundary(_))
    ));
    assert_eq!(editor.state().history_index(), 1);
}

#[test]
fn test_commit_after_undo_drops_redo_tail() {
    let mut editor = single_paragraph();
    editor.dispatch(Action::update_content("p1", "a"));
    editor.dispatch(Action::update_content("p1", "b"));
    editor.dispatch(Action::Undo);
    editor.dispatch(Action::update_content("p1", "c"));

    assert_eq!(editor.state().history().len(), 3);
    assert!(!editor.can_redo());
    assert_eq!(
        editor.container().find("p1").unwrap().as_leaf().unwrap().plain_text(),
        "c"
    );
}

#[test]
fn test_actions_from_json() {
    let mut editor = single_paragraph();
    let actions: Vec<Action> = serde_json::from_value(json!([
        { "type": "INSERT_NODE", "node": { "id": "list", "type": "container", "attributes": { "listType": "ul" }, "children": [] }, "targetId": "p1", "position": "after" },
        { "type": "INSERT_NODE", "node": { "id": "li1", "type": "li", "content": "first" }, "targetId": "list", "position": "inside" },
        { "type": "MOVE_NODE", "id": "p1", "targetId": "li1", "position": "before" },
        { "type": "SET_ACTIVE_NODE", "id": "li1" }
    ]))
    .unwrap();

    for action in actions {
        editor.dispatch(action);
    }

    let list = editor.container().find("list").unwrap().as_container().unwrap();
    assert!(list.is_list());
    assert_eq!(list.children.len(), 2);
    assert_eq!(editor.active_node_id(), Some("li1"));
    assert_eq!(editor.state().history_index(), 3);
}

#[test]
fn test_text_block_survives_save_and_reload() {
    let mut editor = single_paragraph();
    editor.dispatch(Action::update_content("p1", "keep me"));

    let action: Action = serde_json::from_value(
        json!({ "type": "SET_BLOCK_TYPE", "id": "p1", "blockType": "container" }),
    )
    .unwrap();
    let outcome = editor.dispatch(action);
    assert!(matches!(outcome, DispatchOutcome::Ignored(ActionError::InvalidTarget(_))));

    let reloaded = ContainerNode::from_json(&editor.to_json().unwrap()).unwrap();
    let leaf = reloaded.find("p1").and_then(|node| node.as_leaf()).unwrap();
    assert_eq!(leaf.plain_text(), "keep me");
}

#[test]
fn test_dangling_active_node() {
    let mut editor = single_paragraph();
    editor.dispatch(Action::SetActiveNode { id: Some("p1".into()) });
    editor.dispatch(Action::delete("p1"));
    assert_eq!(editor.active_node_id(), Some("p1"));
    assert!(editor.active_node().is_none());
}

struct FakeStorage {
    fail: bool,
}

impl Uploader for FakeStorage {
    async fn upload_image(&self, file: &UploadFile) -> Result<String, UploadError> {
        if self.fail {
            return Err(UploadError::Transport("connection reset".into()));
        }
        Ok(format!("https://cdn.example/{}", file.name))
    }

    async fn upload_cover_image(&self, file: &UploadFile) -> Result<String, UploadError> {
        if self.fail {
            return Err(UploadError::Rejected("too large".into()));
        }
        Ok(format!("https://cdn.example/covers/{}", file.name))
    }
}

fn png(name: &str) -> UploadFile {
    UploadFile::new(name, "image/png", vec![0x89, 0x50, 0x4e, 0x47])
}

#[tokio::test]
async fn test_image_upload_flow() -> anyhow::Result<()> {
    let mut editor = single_paragraph();
    editor.dispatch(Action::InsertImage {
        id: "img1".into(),
        target_id: "p1".into(),
        position: Position::After,
        alt: None,
    });
    assert!(editor.container().find("img1").unwrap().attributes().is_loading());

    let follow_up = upload_image(&FakeStorage { fail: false }, &png("cat.png"), "img1").await;
    assert!(editor.dispatch(follow_up).is_committed());

    let attrs = editor.container().find("img1").unwrap().attributes();
    assert_eq!(attrs.src.as_deref(), Some("https://cdn.example/cat.png"));
    assert!(!attrs.is_loading());
    assert!(!attrs.has_error());
    Ok(())
}

#[tokio::test]
async fn test_failed_upload_sets_error() {
    let mut editor = single_paragraph();
    editor.dispatch(Action::InsertImage {
        id: "img1".into(),
        target_id: "p1".into(),
        position: Position::After,
        alt: None,
    });

    let follow_up = upload_image(&FakeStorage { fail: true }, &png("cat.png"), "img1").await;
    editor.dispatch(follow_up);

    let attrs = editor.container().find("img1").unwrap().attributes();
    assert!(attrs.has_error());
    assert!(!attrs.is_loading());
}

#[tokio::test]
async fn test_upload_for_deleted_node_is_harmless() {
    let mut editor = single_paragraph();
    editor.dispatch(Action::InsertImage {
        id: "img1".into(),
        target_id: "p1".into(),
        position: Position::After,
        alt: None,
    });
    editor.dispatch(Action::delete("img1"));
    let history_len = editor.state().history().len();

    let follow_up = upload_image(&FakeStorage { fail: false }, &png("cat.png"), "img1").await;
    let outcome = editor.dispatch(follow_up);

    assert_eq!(outcome, DispatchOutcome::Ignored(ActionError::NotFound("img1".into())));
    assert_eq!(editor.state().history().len(), history_len);
}

#[tokio::test]
async fn test_non_image_file_is_rejected() {
    let file = UploadFile::new("notes.txt", "text/plain", b"hi".to_vec());
    let action = upload_image(&FakeStorage { fail: false }, &file, "img1").await;
    assert_eq!(action, Action::ImageUploadFailed { id: "img1".into() });
}

#[tokio::test]
async fn test_cover_upload() {
    let mut editor = single_paragraph();

    let failed = upload_cover_image(&FakeStorage { fail: true }, &png("c.png")).await;
    editor.dispatch(failed);
    assert_eq!(
        editor.container().attributes.extra.get(COVER_ERROR_KEY),
        Some(&json!(true))
    );

    let done = upload_cover_image(&FakeStorage { fail: false }, &png("c.png")).await;
    editor.dispatch(done);
    let extra = &editor.container().attributes.extra;
    assert_eq!(extra.get(COVER_IMAGE_KEY), Some(&json!("https://cdn.example/covers/c.png")));
    assert!(extra.get(COVER_ERROR_KEY).is_none());
}
