use serde_json::{json, Value};
use strata_compiler_html::{compile_to_html, CompileOptions};
use strata_editor::{Action, DispatchOutcome, Editor, EditorConfig, SelectionDescription};
use strata_model::{default_document, ContainerNode, Node};
use strata_surface::{build_markup, render_tree};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// JSON shape of a dispatch result handed back to the host.
pub fn outcome_json(outcome: &DispatchOutcome) -> Value {
    match outcome {
        DispatchOutcome::Committed { history_index } => {
            json!({ "outcome": "committed", "historyIndex": history_index })
        }
        DispatchOutcome::Moved { history_index } => {
            json!({ "outcome": "moved", "historyIndex": history_index })
        }
        DispatchOutcome::Updated => json!({ "outcome": "updated" }),
        DispatchOutcome::Ignored(reason) => {
            json!({ "outcome": "ignored", "reason": reason.to_string() })
        }
    }
}

/// A mounted editor, driven from JS with JSON strings.
#[wasm_bindgen]
pub struct EditorHandle {
    editor: Editor,
}

impl EditorHandle {
    pub fn open(document_json: Option<&str>, read_only: bool) -> Result<Self, String> {
        let config = EditorConfig {
            read_only,
            ..EditorConfig::default()
        };
        let editor = match document_json {
            Some(json) => Editor::from_json(json, config),
            None => Editor::new(default_document(), config),
        }
        .map_err(|e| format!("Invalid document: {}", e))?;
        Ok(Self { editor })
    }

    pub fn dispatch_json(&mut self, action_json: &str) -> Result<Value, String> {
        let action: Action =
            serde_json::from_str(action_json).map_err(|e| format!("Invalid action: {}", e))?;
        Ok(outcome_json(&self.editor.dispatch(action)))
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }
}

#[wasm_bindgen]
impl EditorHandle {
    /// Open a document; without one the editor starts with an empty paragraph.
    #[wasm_bindgen(constructor)]
    pub fn new(document_json: Option<String>, read_only: bool) -> Result<EditorHandle, JsValue> {
        Self::open(document_json.as_deref(), read_only).map_err(js_error)
    }

    /// Dispatch one action and return the outcome as JSON
    pub fn dispatch(&mut self, action_json: &str) -> Result<String, JsValue> {
        self.dispatch_json(action_json)
            .map(|outcome| outcome.to_string())
            .map_err(js_error)
    }

    pub fn undo(&mut self) -> bool {
        self.editor.dispatch(Action::Undo).changed_document()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.dispatch(Action::Redo).changed_document()
    }

    #[wasm_bindgen(getter, js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(getter, js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Bumped on every dispatch that changed the document
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> f64 {
        self.editor.version() as f64
    }

    #[wasm_bindgen(getter, js_name = activeNodeId)]
    pub fn active_node_id(&self) -> Option<String> {
        self.editor.active_node_id().map(str::to_string)
    }

    #[wasm_bindgen(getter, js_name = readOnly)]
    pub fn read_only(&self) -> bool {
        self.editor.is_read_only()
    }

    #[wasm_bindgen(setter, js_name = readOnly)]
    pub fn set_read_only(&mut self, read_only: bool) {
        self.editor.set_read_only(read_only);
    }

    /// Current document as JSON
    pub fn document(&self) -> Result<String, JsValue> {
        self.editor
            .to_json()
            .map_err(|e| js_error(e.to_string()))
    }

    /// Block tree as JSON, for hosts that render it themselves
    #[wasm_bindgen(js_name = blockTree)]
    pub fn block_tree(&self) -> Result<String, JsValue> {
        let view = render_tree(self.editor.container(), self.editor.is_read_only());
        serde_json::to_string(&view).map_err(|e| js_error(e.to_string()))
    }

    /// Markup of one text leaf; `undefined` for containers and unknown ids
    pub fn markup(&self, node_id: &str) -> Option<String> {
        let leaf = self.editor.container().find(node_id)?.as_leaf()?;
        Some(build_markup(leaf, self.editor.is_read_only()))
    }

    /// Record the selection reported by the host surface
    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&mut self, selection_json: Option<String>) -> Result<(), JsValue> {
        let selection = selection_json
            .map(|json| serde_json::from_str::<SelectionDescription>(&json))
            .transpose()
            .map_err(|e| js_error(format!("Invalid selection: {}", e)))?;
        self.editor.set_selection(selection);
        Ok(())
    }

    pub fn selection(&self) -> Option<String> {
        self.editor
            .selection()
            .and_then(|s| serde_json::to_string(s).ok())
    }

    /// Export the current document to HTML
    #[wasm_bindgen(js_name = exportHtml)]
    pub fn export_html(&self, full_document: bool) -> Result<String, JsValue> {
        let options = CompileOptions {
            full_document,
            ..CompileOptions::default()
        };
        compile_to_html(self.editor.container(), &options).map_err(|e| js_error(e.to_string()))
    }
}

/// Markup for a single leaf given as JSON
#[wasm_bindgen(js_name = buildMarkup)]
pub fn build_markup_js(node_json: &str, read_only: bool) -> Result<String, JsValue> {
    let node: Node =
        serde_json::from_str(node_json).map_err(|e| js_error(format!("Invalid node: {}", e)))?;
    match node.as_leaf() {
        Some(leaf) => Ok(build_markup(leaf, read_only)),
        None => Err(js_error("Containers have no markup".to_string())),
    }
}

/// Validate a document and return it normalized
#[wasm_bindgen(js_name = normalizeDocument)]
pub fn normalize_document_js(document_json: &str) -> Result<String, JsValue> {
    ContainerNode::from_json(document_json)
        .and_then(|doc| doc.to_json_pretty())
        .map_err(|e| js_error(e.to_string()))
}
