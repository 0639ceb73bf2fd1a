use super::*;

fn forest() -> Vec<Node> {
    vec![
        Node::folder(
            "a",
            "a",
            vec![
                Node::folder(
                    "inner",
                    "a/inner",
                    vec![Node::file("deep.excalidraw", "a/inner/deep.excalidraw")],
                ),
                Node::file("b.excalidraw", "a/b.excalidraw"),
            ],
        ),
        Node::folder("notes", "notes", Vec::new()),
        Node::file("Sketch.excalidraw", "Sketch.excalidraw"),
    ]
}

fn loaded() -> TreeSyncController {
    let mut tree = TreeSyncController::new();
    let effects = tree.refresh();
    let Effect::ListTree { request } = effects[0] else {
        panic!("expected a listing request");
    };
    tree.apply_listed(request, Ok(forest()));
    tree
}

fn only_mutation(effects: &[Effect]) -> &Mutation {
    match effects {
        [Effect::Mutate(mutation)] => mutation,
        other => panic!("expected a single mutation, got {other:?}"),
    }
}

fn list_request(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::ListTree { request } => Some(*request),
            _ => None,
        })
        .expect("expected a listing request")
}

#[test]
fn refresh_replaces_forest_and_clears_loading() {
    let mut tree = TreeSyncController::new();
    let request = list_request(&tree.refresh());
    assert!(tree.is_loading());

    tree.apply_listed(request, Ok(forest()));
    assert!(!tree.is_loading());
    assert_eq!(tree.forest().len(), 3);
}

#[test]
fn refresh_failure_keeps_forest_and_sets_banner() {
    let mut tree = loaded();
    let request = list_request(&tree.refresh());

    tree.apply_listed(request, Err(GatewayError::new("disk gone")));

    assert!(!tree.is_loading());
    assert_eq!(tree.forest(), forest().as_slice());
    assert_eq!(tree.banner(), Some("Failed to load files: disk gone"));

    let request = list_request(&tree.refresh());
    tree.apply_listed(request, Ok(forest()));
    assert!(tree.banner().is_none());
}

#[test]
fn refresh_keeps_selection_that_still_exists() {
    let mut tree = loaded();
    assert!(tree.select(Some("a/b.excalidraw")));

    let mut reordered = forest();
    reordered.reverse();
    let request = list_request(&tree.refresh());
    tree.apply_listed(request, Ok(reordered));

    assert_eq!(tree.selected_path(), Some("a/b.excalidraw"));
}

#[test]
fn refresh_clears_selection_that_vanished() {
    let mut tree = loaded();
    tree.select(Some("a/b.excalidraw"));

    let without = vec![Node::file("Sketch.excalidraw", "Sketch.excalidraw")];
    let request = list_request(&tree.refresh());
    tree.apply_listed(request, Ok(without));

    assert_eq!(tree.selected_path(), None);
}

#[test]
fn refresh_without_selection_stays_unselected() {
    let mut tree = loaded();
    let request = list_request(&tree.refresh());
    tree.apply_listed(request, Ok(forest()));
    assert_eq!(tree.selected_path(), None);
}

#[test]
fn stale_listing_does_not_overwrite_newer_one() {
    let mut tree = TreeSyncController::new();
    let first = list_request(&tree.refresh());
    let second = list_request(&tree.refresh());

    tree.apply_listed(second, Ok(forest()));
    tree.apply_listed(first, Ok(Vec::new()));

    assert_eq!(tree.forest().len(), 3);
    assert!(!tree.is_loading());
}

#[test]
fn toggle_expand_only_affects_folders() {
    let mut tree = loaded();
    assert!(!tree.is_expanded("a"));

    assert!(tree.toggle_expand("a"));
    assert!(tree.is_expanded("a"));
    assert!(tree.toggle_expand("a"));
    assert!(!tree.is_expanded("a"));

    assert!(!tree.toggle_expand("Sketch.excalidraw"));
    assert!(tree.expanded().is_empty());
}

#[test]
fn select_ignores_unknown_paths() {
    let mut tree = loaded();
    assert!(!tree.select(Some("missing.excalidraw")));
    assert_eq!(tree.selected_path(), None);

    assert!(tree.select(Some("a")));
    assert_eq!(tree.selected_document(), None);
    assert!(tree.select(Some("Sketch.excalidraw")));
    assert_eq!(tree.selected_document(), Some("Sketch.excalidraw"));
    assert!(tree.select(None));
}

#[test]
fn create_canvas_sanitizes_and_appends_suffix() {
    let mut tree = loaded();
    let effects = tree.create(CreateKind::Canvas, "a", "  my/canvas ");
    assert_eq!(
        only_mutation(&effects),
        &Mutation::CreateCanvas {
            path: "a/my-canvas.excalidraw".to_string()
        }
    );

    let effects = tree.create(CreateKind::Canvas, "", "Done.excalidraw");
    assert_eq!(
        only_mutation(&effects),
        &Mutation::CreateCanvas {
            path: "Done.excalidraw".to_string()
        }
    );
}

#[test]
fn create_with_blank_name_makes_no_call() {
    let mut tree = loaded();
    assert!(tree.create(CreateKind::Folder, "", "   ").is_empty());
    assert!(tree.create(CreateKind::Canvas, "a", "").is_empty());
    assert!(!tree.has_pending_mutations());
}

#[test]
fn created_folder_is_expanded_after_success_only() {
    let mut tree = loaded();
    let effects = tree.create(CreateKind::Folder, "notes", "Ideas");
    let mutation = only_mutation(&effects).clone();
    assert_eq!(
        mutation,
        Mutation::CreateFolder {
            path: "notes/Ideas".to_string()
        }
    );
    assert!(!tree.is_expanded("notes/Ideas"));

    let follow_up = tree.apply_mutation_finished(&mutation, Ok(()));
    assert!(tree.is_expanded("notes/Ideas"));
    assert!(matches!(follow_up.as_slice(), [Effect::ListTree { .. }]));
}

#[test]
fn failed_mutation_surfaces_alert_without_local_changes() {
    let mut tree = loaded();
    let effects = tree.create(CreateKind::Folder, "", "Ideas");
    let mutation = only_mutation(&effects).clone();

    let follow_up = tree.apply_mutation_finished(&mutation, Err(GatewayError::new("denied")));

    assert!(follow_up.is_empty());
    assert!(!tree.is_expanded("Ideas"));
    assert_eq!(tree.alert(), Some("Failed to create folder: denied"));
    assert!(!tree.has_pending_mutations());

    assert!(tree.dismiss_alert());
    assert!(tree.alert().is_none());
}

#[test]
fn rename_canvas_keeps_suffix_and_parent() {
    let mut tree = loaded();
    let effects = tree.rename("a/b.excalidraw", "Plan: v2");
    assert_eq!(
        only_mutation(&effects),
        &Mutation::Rename {
            from: "a/b.excalidraw".to_string(),
            to: "a/Plan- v2.excalidraw".to_string(),
            is_folder: false,
        }
    );
}

#[test]
fn rename_to_same_or_blank_name_is_noop() {
    let mut tree = loaded();
    assert!(tree.rename("a/b.excalidraw", " b ").is_empty());
    assert!(tree.rename("a/b.excalidraw", "  ").is_empty());
    assert!(tree.rename("missing", "x").is_empty());
}

#[test]
fn renamed_expanded_folder_carries_expansion() {
    let mut tree = loaded();
    tree.toggle_expand("a");
    tree.toggle_expand("a/inner");

    let effects = tree.rename("a", "alpha");
    let mutation = only_mutation(&effects).clone();
    assert_eq!(
        mutation,
        Mutation::Rename {
            from: "a".to_string(),
            to: "alpha".to_string(),
            is_folder: true,
        }
    );

    tree.apply_mutation_finished(&mutation, Ok(()));
    assert!(tree.is_expanded("alpha"));
    assert!(tree.is_expanded("alpha/inner"));
    assert!(!tree.is_expanded("a"));
}

#[test]
fn move_rejects_self_containment() {
    let mut tree = loaded();
    assert!(tree.move_item("a", Some("a")).is_empty());
    assert!(tree.move_item("a", Some("a/inner")).is_empty());
}

#[test]
fn move_into_file_or_unknown_target_is_rejected() {
    let mut tree = loaded();
    assert!(tree
        .move_item("a/b.excalidraw", Some("Sketch.excalidraw"))
        .is_empty());
    assert!(tree.move_item("a/b.excalidraw", Some("missing")).is_empty());
    assert!(!tree.has_pending_mutations());
}

#[test]
fn move_into_current_parent_is_noop() {
    let mut tree = loaded();
    assert!(tree.move_item("a/b.excalidraw", Some("a")).is_empty());
    assert!(tree.move_item("Sketch.excalidraw", None).is_empty());
}

#[test]
fn move_to_sibling_prefix_folder_is_allowed() {
    let mut tree = TreeSyncController::new();
    let request = list_request(&tree.refresh());
    let mut listing = forest();
    listing.push(Node::folder("ab", "ab", Vec::new()));
    tree.apply_listed(request, Ok(listing));

    let effects = tree.move_item("a", Some("ab"));
    assert_eq!(
        only_mutation(&effects),
        &Mutation::Move {
            from: "a".to_string(),
            to: "ab/a".to_string(),
            target_folder: Some("ab".to_string()),
        }
    );
}

#[test]
fn move_expands_target_after_success() {
    let mut tree = loaded();
    let effects = tree.move_item("a/inner/deep.excalidraw", Some("notes"));
    let mutation = only_mutation(&effects).clone();
    assert_eq!(
        mutation,
        Mutation::Move {
            from: "a/inner/deep.excalidraw".to_string(),
            to: "notes/deep.excalidraw".to_string(),
            target_folder: Some("notes".to_string()),
        }
    );

    let follow_up = tree.apply_mutation_finished(&mutation, Ok(()));
    assert!(tree.is_expanded("notes"));
    assert!(matches!(follow_up.as_slice(), [Effect::ListTree { .. }]));
}

#[test]
fn move_nested_item_to_root() {
    let mut tree = loaded();
    let effects = tree.move_item("a/inner/deep.excalidraw", None);
    assert_eq!(
        only_mutation(&effects),
        &Mutation::Move {
            from: "a/inner/deep.excalidraw".to_string(),
            to: "deep.excalidraw".to_string(),
            target_folder: None,
        }
    );
}

#[test]
fn copy_picks_unique_name_and_expands_destination() {
    let mut tree = TreeSyncController::new();
    let request = list_request(&tree.refresh());
    let mut listing = forest();
    listing.push(Node::file("Sketch copy.excalidraw", "Sketch copy.excalidraw"));
    tree.apply_listed(request, Ok(listing));

    let effects = tree.copy("Sketch.excalidraw", None);
    assert_eq!(
        only_mutation(&effects),
        &Mutation::Copy {
            from: "Sketch.excalidraw".to_string(),
            to: "Sketch copy 2.excalidraw".to_string(),
            target_folder: None,
        }
    );

    let effects = tree.copy("Sketch.excalidraw", Some("notes"));
    let mutation = only_mutation(&effects).clone();
    assert_eq!(
        mutation,
        Mutation::Copy {
            from: "Sketch.excalidraw".to_string(),
            to: "notes/Sketch copy.excalidraw".to_string(),
            target_folder: Some("notes".to_string()),
        }
    );
    tree.apply_mutation_finished(&mutation, Ok(()));
    assert!(tree.is_expanded("notes"));
}

#[test]
fn copy_of_folder_is_rejected() {
    let mut tree = loaded();
    assert!(tree.copy("a", None).is_empty());
}

#[test]
fn trash_refreshes_tree_and_trash_listing() {
    let mut tree = loaded();
    let effects = tree.trash_item("Sketch.excalidraw");
    let mutation = only_mutation(&effects).clone();

    let follow_up = tree.apply_mutation_finished(&mutation, Ok(()));
    assert!(matches!(
        follow_up.as_slice(),
        [Effect::ListTree { .. }, Effect::ListTrash]
    ));
}

#[test]
fn failed_trash_raises_alert_and_skips_refresh() {
    let mut tree = loaded();
    let effects = tree.trash_item("Sketch.excalidraw");
    let mutation = only_mutation(&effects).clone();

    let follow_up = tree.apply_mutation_finished(&mutation, Err(GatewayError::new("busy")));
    assert!(follow_up.is_empty());
    assert_eq!(tree.alert(), Some("Failed to move to trash: busy"));
    assert_eq!(tree.forest(), forest().as_slice());
}

#[test]
fn delete_permanently_refreshes_only_trash_listing() {
    let mut tree = loaded();
    let effects = tree.delete_permanently("1700000000000_old.excalidraw");
    let mutation = only_mutation(&effects).clone();
    assert_eq!(
        mutation,
        Mutation::DeletePermanently {
            trash_path: "1700000000000_old.excalidraw".to_string(),
        }
    );

    let follow_up = tree.apply_mutation_finished(&mutation, Ok(()));
    assert_eq!(follow_up, vec![Effect::ListTrash]);
    assert!(!tree.has_pending_mutations());
}

#[test]
fn legacy_delete_refreshes_tree() {
    let mut tree = loaded();
    let effects = tree.delete("a/b.excalidraw");
    let mutation = only_mutation(&effects).clone();
    assert_eq!(
        mutation,
        Mutation::Delete {
            path: "a/b.excalidraw".to_string(),
        }
    );

    let follow_up = tree.apply_mutation_finished(&mutation, Ok(()));
    assert!(matches!(follow_up.as_slice(), [Effect::ListTree { .. }]));
}

#[test]
fn empty_trash_is_noop_when_listing_is_empty() {
    let mut tree = loaded();
    assert!(tree.empty_trash().is_empty());

    tree.apply_trash_listed(Ok(vec![TrashEntry {
        name: "old".to_string(),
        trash_path: "1700000000000_old.excalidraw".to_string(),
        original_path: "old.excalidraw".to_string(),
        is_folder: false,
        trashed_at: 1_700_000_000_000,
    }]));
    let effects = tree.empty_trash();
    let mutation = only_mutation(&effects).clone();
    assert_eq!(mutation, Mutation::EmptyTrash);

    let follow_up = tree.apply_mutation_finished(&mutation, Ok(()));
    assert_eq!(follow_up, vec![Effect::ListTrash]);
}

#[test]
fn set_icon_passes_through_and_refreshes() {
    let mut tree = loaded();
    let effects = tree.set_icon("a", Some("star".to_string()), Some("default".to_string()));
    let mutation = only_mutation(&effects).clone();
    assert_eq!(
        mutation,
        Mutation::SetIcon {
            path: "a".to_string(),
            icon: Some("star".to_string()),
            color: Some("default".to_string()),
        }
    );
    let follow_up = tree.apply_mutation_finished(&mutation, Ok(()));
    assert!(matches!(follow_up.as_slice(), [Effect::ListTree { .. }]));
}

#[test]
fn rows_follow_expansion() {
    let mut tree = loaded();
    let names: Vec<_> = tree.rows().into_iter().map(|row| row.path).collect();
    assert_eq!(names, vec!["a", "notes", "Sketch.excalidraw"]);

    tree.toggle_expand("a");
    let rows = tree.rows();
    let names: Vec<_> = rows.iter().map(|row| row.path.as_str()).collect();
    assert_eq!(
        names,
        vec!["a", "a/inner", "a/b.excalidraw", "notes", "Sketch.excalidraw"]
    );
    assert_eq!(rows[1].depth, 1);
    assert_eq!(rows[2].name, "b");
}

#[test]
fn rows_open_every_folder_while_searching() {
    let mut tree = loaded();
    tree.set_search_query("deep");
    let names: Vec<_> = tree.rows().into_iter().map(|row| row.path).collect();
    assert_eq!(names, vec!["a", "a/inner", "a/inner/deep.excalidraw"]);
}
