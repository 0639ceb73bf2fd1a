use super::*;
use crate::kernel::services::ports::GatewayError;
use crate::kernel::{DocumentPhase, Mutation, SaveReason};
use crate::models::{CanvasSnapshot, Node};
use std::time::{Duration, Instant};

fn new_store() -> Store {
    Store::new(&SessionConfig::default())
}

fn listing() -> Vec<Node> {
    vec![
        Node::folder(
            "a",
            "a",
            vec![Node::file("x.excalidraw", "a/x.excalidraw")],
        ),
        Node::file("b.excalidraw", "b.excalidraw"),
    ]
}

fn loaded_store() -> Store {
    let mut store = new_store();
    let result = store.dispatch(Action::Tree(TreeAction::Refresh));
    let Some(Effect::ListTree { request }) = result.effects.first().cloned() else {
        panic!("expected listing request");
    };
    store.dispatch(Action::Tree(TreeAction::Listed {
        request,
        result: Ok(listing()),
    }));
    store
}

fn select(store: &mut Store, path: &str) -> DispatchResult {
    let result = store.dispatch(Action::Tree(TreeAction::Select {
        path: Some(path.to_string()),
    }));
    store.dispatch(Action::Document(DocumentAction::Loaded {
        path: path.to_string(),
        result: Ok("{}".to_string()),
    }));
    result
}

fn change(store: &mut Store, now: Instant) {
    store.dispatch(Action::Document(DocumentAction::Changed {
        snapshot: CanvasSnapshot::default(),
        now,
    }));
}

#[test]
fn selecting_a_canvas_reads_it() {
    let mut store = loaded_store();
    let result = store.dispatch(Action::Tree(TreeAction::Select {
        path: Some("b.excalidraw".to_string()),
    }));

    assert!(result.state_changed);
    assert_eq!(
        result.effects,
        vec![Effect::ReadCanvas {
            path: "b.excalidraw".to_string()
        }]
    );
    assert_eq!(store.document().live_path(), Some("b.excalidraw"));
}

#[test]
fn selecting_a_folder_opens_no_document() {
    let mut store = loaded_store();
    let result = store.dispatch(Action::Tree(TreeAction::Select {
        path: Some("a".to_string()),
    }));

    assert!(result.state_changed);
    assert!(result.effects.is_empty());
    assert!(store.document().live_path().is_none());
}

#[test]
fn refresh_that_drops_selection_closes_document_with_flush() {
    let mut store = loaded_store();
    select(&mut store, "b.excalidraw");
    change(&mut store, Instant::now());

    let result = store.dispatch(Action::Tree(TreeAction::Refresh));
    let request = match result.effects.as_slice() {
        [Effect::ListTree { request }] => *request,
        other => panic!("unexpected effects {other:?}"),
    };
    let result = store.dispatch(Action::Tree(TreeAction::Listed {
        request,
        result: Ok(vec![Node::folder("a", "a", Vec::new())]),
    }));

    assert!(matches!(
        result.effects.as_slice(),
        [Effect::SaveCanvas { path, reason: SaveReason::Flush, .. }] if path == "b.excalidraw"
    ));
    assert_eq!(store.document().phase(), DocumentPhase::Idle);
    assert!(store.tree().selected_path().is_none());
}

#[test]
fn tick_fires_autosave_after_debounce() {
    let mut store = loaded_store();
    select(&mut store, "b.excalidraw");
    let start = Instant::now();
    change(&mut store, start);

    let early = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(999),
    });
    assert!(early.effects.is_empty());

    let fired = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(1000),
    });
    assert!(matches!(
        fired.effects.as_slice(),
        [Effect::SaveCanvas { reason: SaveReason::Autosave, .. }]
    ));
}

#[test]
fn trashing_open_canvas_flushes_before_the_mutation() {
    let mut store = loaded_store();
    select(&mut store, "a/x.excalidraw");
    change(&mut store, Instant::now());

    let result = store.dispatch(Action::Tree(TreeAction::Trash {
        path: "a".to_string(),
    }));

    assert_eq!(result.effects.len(), 2);
    assert!(matches!(
        &result.effects[0],
        Effect::SaveCanvas { path, reason: SaveReason::Flush, .. } if path == "a/x.excalidraw"
    ));
    assert_eq!(
        result.effects[1],
        Effect::Mutate(Mutation::Trash {
            path: "a".to_string()
        })
    );
}

#[test]
fn successful_removal_discards_changes_made_meanwhile() {
    let mut store = loaded_store();
    select(&mut store, "a/x.excalidraw");
    let now = Instant::now();

    store.dispatch(Action::Tree(TreeAction::Trash {
        path: "a/x.excalidraw".to_string(),
    }));
    change(&mut store, now);
    assert!(store.document().has_unsaved_changes());

    store.dispatch(Action::Tree(TreeAction::MutationFinished {
        mutation: Mutation::Trash {
            path: "a/x.excalidraw".to_string(),
        },
        result: Ok(()),
    }));

    assert!(!store.document().has_unsaved_changes());
    let tick = store.dispatch(Action::Tick {
        now: now + Duration::from_secs(2),
    });
    assert!(tick.effects.is_empty());
}

#[test]
fn failed_removal_keeps_unsaved_changes() {
    let mut store = loaded_store();
    select(&mut store, "b.excalidraw");
    change(&mut store, Instant::now());

    let result = store.dispatch(Action::Tree(TreeAction::MutationFinished {
        mutation: Mutation::Delete {
            path: "b.excalidraw".to_string(),
        },
        result: Err(GatewayError::new("locked")),
    }));

    assert!(result.effects.is_empty());
    assert!(store.document().has_unsaved_changes());
    assert_eq!(store.tree().alert(), Some("Failed to delete: locked"));
}

#[test]
fn saved_completion_settles_document() {
    let mut store = loaded_store();
    select(&mut store, "b.excalidraw");
    let start = Instant::now();
    change(&mut store, start);
    store.dispatch(Action::Tick {
        now: start + Duration::from_secs(1),
    });
    assert_eq!(store.document().phase(), DocumentPhase::Saving);

    let result = store.dispatch(Action::Document(DocumentAction::Saved {
        path: "b.excalidraw".to_string(),
        reason: SaveReason::Autosave,
        result: Ok(()),
    }));
    assert!(result.state_changed);
    assert_eq!(store.document().phase(), DocumentPhase::Ready);
}

#[test]
fn flush_writes_pending_data() {
    let mut store = loaded_store();
    select(&mut store, "b.excalidraw");
    change(&mut store, Instant::now());

    let result = store.flush();
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::SaveCanvas { reason: SaveReason::Flush, .. }]
    ));
    assert!(store.flush().effects.is_empty());
}
