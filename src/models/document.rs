//! Canvas document model and its persisted JSON form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DOCUMENT_TYPE: &str = "excalidraw";
pub const DOCUMENT_VERSION: u32 = 2;
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub background_color: Option<String>,
    pub zoom: Option<Zoom>,
    pub scroll_x: Option<f64>,
    pub scroll_y: Option<f64>,
    pub grid_size: Option<f64>,
}

/// What the drawing surface reports on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasSnapshot {
    pub elements: Vec<Value>,
    pub view_state: ViewState,
    pub attached_files: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    pub path: String,
    pub elements: Vec<Value>,
    pub view_state: ViewState,
    pub attached_files: BTreeMap<String, Value>,
}

impl DocumentState {
    pub fn empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            elements: Vec::new(),
            view_state: ViewState {
                background_color: Some(DEFAULT_BACKGROUND.to_string()),
                ..ViewState::default()
            },
            attached_files: BTreeMap::new(),
        }
    }

    pub fn from_snapshot(path: impl Into<String>, snapshot: CanvasSnapshot) -> Self {
        Self {
            path: path.into(),
            elements: snapshot.elements,
            view_state: snapshot.view_state,
            attached_files: snapshot.attached_files,
        }
    }

    /// Parses persisted content; any malformed input yields `None`.
    pub fn parse(path: impl Into<String>, content: &str) -> Option<Self> {
        let file: CanvasFile = serde_json::from_str(content).ok()?;
        Some(Self {
            path: path.into(),
            elements: file.elements,
            view_state: ViewState {
                background_color: Some(file.app_state.view_background_color),
                zoom: file.app_state.zoom,
                scroll_x: file.app_state.scroll_x,
                scroll_y: file.app_state.scroll_y,
                grid_size: file.app_state.grid_size,
            },
            attached_files: file.files,
        })
    }
}

/// Serializes a change snapshot into the persisted document text.
pub fn serialize_snapshot(snapshot: &CanvasSnapshot) -> serde_json::Result<String> {
    let view = &snapshot.view_state;
    let file = CanvasFileRef {
        kind: DOCUMENT_TYPE,
        version: DOCUMENT_VERSION,
        source: None,
        elements: &snapshot.elements,
        app_state: PersistedAppState {
            view_background_color: view
                .background_color
                .clone()
                .filter(|color| !color.is_empty())
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            zoom: view.zoom,
            scroll_x: view.scroll_x,
            scroll_y: view.scroll_y,
            grid_size: view.grid_size,
        },
        files: &snapshot.attached_files,
    };
    serde_json::to_string(&file)
}

/// Content written by `createCanvas`.
pub fn default_document_content(source: &str) -> String {
    let file = CanvasFileRef {
        kind: DOCUMENT_TYPE,
        version: DOCUMENT_VERSION,
        source: Some(source),
        elements: &[],
        app_state: PersistedAppState::default(),
        files: &BTreeMap::new(),
    };
    serde_json::to_string(&file).unwrap_or_default()
}

#[derive(Deserialize)]
struct CanvasFile {
    #[serde(default, rename = "type")]
    _kind: Option<String>,
    #[serde(default, rename = "version")]
    _version: Option<u32>,
    #[serde(default)]
    elements: Vec<Value>,
    #[serde(default, rename = "appState")]
    app_state: PersistedAppState,
    #[serde(default)]
    files: BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct CanvasFileRef<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    elements: &'a [Value],
    #[serde(rename = "appState")]
    app_state: PersistedAppState,
    files: &'a BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAppState {
    #[serde(default = "default_background")]
    view_background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zoom: Option<Zoom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scroll_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scroll_y: Option<f64>,
    #[serde(default)]
    grid_size: Option<f64>,
}

impl Default for PersistedAppState {
    fn default() -> Self {
        Self {
            view_background_color: default_background(),
            zoom: None,
            scroll_x: None,
            scroll_y: None,
            grid_size: None,
        }
    }
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/models/document.rs"]
mod tests;
