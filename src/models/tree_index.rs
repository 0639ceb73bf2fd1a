//! Pure lookups over a forest of [`Node`]s: path search, name filtering, copy naming.

use std::borrow::Cow;

use super::node::{Node, NodeKind};

pub const CANVAS_EXTENSION: &str = ".excalidraw";

const FORBIDDEN_NAME_CHARS: [char; 10] = ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Depth-first, parents before children, siblings in order.
pub fn find_by_path<'a>(forest: &'a [Node], path: &str) -> Option<&'a Node> {
    if path.is_empty() {
        return None;
    }

    for node in forest {
        if node.path == path {
            return Some(node);
        }
        if let Some(found) = node.children().and_then(|c| find_by_path(c, path)) {
            return Some(found);
        }
    }
    None
}

/// Case-insensitive substring filter on display names.
///
/// A matching folder is kept with its whole subtree; a non-matching folder survives only
/// with the children that matched. An empty query hands the input back untouched.
pub fn filter<'a>(forest: &'a [Node], query: &str) -> Cow<'a, [Node]> {
    if query.is_empty() {
        return Cow::Borrowed(forest);
    }
    let needle = query.to_lowercase();
    Cow::Owned(filter_matching(forest, &needle))
}

fn filter_matching(forest: &[Node], needle: &str) -> Vec<Node> {
    let mut kept = Vec::new();
    for node in forest {
        let matches = node.display_name().to_lowercase().contains(needle);
        match &node.kind {
            NodeKind::File => {
                if matches {
                    kept.push(node.clone());
                }
            }
            NodeKind::Folder { children } => {
                if matches {
                    kept.push(node.clone());
                    continue;
                }
                let Some(children) = children else {
                    continue;
                };
                let filtered = filter_matching(children, needle);
                if filtered.is_empty() {
                    continue;
                }
                kept.push(Node {
                    name: node.name.clone(),
                    path: node.path.clone(),
                    kind: NodeKind::Folder {
                        children: Some(filtered),
                    },
                    icon: node.icon.clone(),
                    icon_color: node.icon_color.clone(),
                    modified: node.modified,
                    size: node.size,
                });
            }
        }
    }
    kept
}

/// `"{base} copy"`, `"{base} copy 2"`, ... with the canvas suffix, first path not in the forest.
pub fn unique_copy_name(forest: &[Node], target_folder: &str, base: &str) -> String {
    let mut attempt: u32 = 1;
    loop {
        let name = if attempt == 1 {
            format!("{base} copy{CANVAS_EXTENSION}")
        } else {
            format!("{base} copy {attempt}{CANVAS_EXTENSION}")
        };
        let candidate = join_path(target_folder, &name);
        if find_by_path(forest, &candidate).is_none() {
            return candidate;
        }
        attempt += 1;
    }
}

pub fn sanitize_name(input: &str) -> String {
    input
        .chars()
        .map(|ch| if FORBIDDEN_NAME_CHARS.contains(&ch) { '-' } else { ch })
        .collect()
}

pub fn parent_of(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[..idx]).unwrap_or("")
}

pub fn base_name(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[idx + 1..]).unwrap_or(path)
}

pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

pub fn display_name(name: &str) -> &str {
    name.strip_suffix(CANVAS_EXTENSION).unwrap_or(name)
}

pub fn is_canvas_path(path: &str) -> bool {
    path.ends_with(CANVAS_EXTENSION)
}

pub fn with_canvas_extension(name: &str) -> String {
    if is_canvas_path(name) {
        name.to_string()
    } else {
        format!("{name}{CANVAS_EXTENSION}")
    }
}

/// `true` when `path` is `ancestor` itself or lies somewhere below it.
pub fn is_same_or_within(path: &str, ancestor: &str) -> bool {
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Re-roots `path` from `from` onto `to` when it is `from` or a descendant of it.
pub fn remap_prefix(path: &str, from: &str, to: &str) -> Option<String> {
    if !is_same_or_within(path, from) {
        return None;
    }
    Some(format!("{to}{}", &path[from.len()..]))
}

#[cfg(test)]
#[path = "../../tests/unit/models/tree_index.rs"]
mod tests;
