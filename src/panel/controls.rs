//! Stable identifiers of the interactive controls. End-to-end tests bind to
//! these literally.

pub const ADD_REWRITE: &str = "add-rewrite";
pub const DOMAIN_INPUT: &str = "rewrite-domain-input";
pub const ANSWER_INPUT: &str = "rewrite-answer-input";
pub const SAVE_BUTTON: &str = "rewrite-save-button";
pub const GLOBAL_TOGGLE: &str = "rewrite-global-toggle";
pub const DELETE_CONFIRM: &str = "rewrite-delete-confirm";

pub fn row_toggle(domain: &str) -> String {
    format!("rewrite-toggle-{domain}")
}

pub fn row_edit(domain: &str) -> String {
    format!("edit-rewrite-{domain}")
}

pub fn row_delete(domain: &str) -> String {
    format!("delete-rewrite-{domain}")
}

/// An interactive element as the view should render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: String,
    pub disabled: bool,
}

impl Control {
    pub fn new(id: impl Into<String>, disabled: bool) -> Self {
        Self {
            id: id.into(),
            disabled,
        }
    }
}
