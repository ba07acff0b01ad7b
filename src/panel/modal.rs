use crate::common::{Result, RewriteRecord};

use super::controls::{self, Control};
use super::{BusyFlags, Operation};

/// Fields shared by the add and edit dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteForm {
    pub domain: String,
    pub answer: String,
}

impl RewriteForm {
    pub fn from_record(record: &RewriteRecord) -> Self {
        Self {
            domain: record.domain.clone(),
            answer: record.answer.clone(),
        }
    }

    /// Gates the save control.
    pub fn can_submit(&self) -> bool {
        !self.domain.trim().is_empty() && !self.answer.trim().is_empty()
    }

    pub fn to_record(&self, enabled: bool) -> Result<RewriteRecord> {
        let record = RewriteRecord {
            domain: self.domain.trim().to_string(),
            answer: self.answer.trim().to_string(),
            enabled,
        };
        record.validate()?;
        Ok(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Add(RewriteForm),
    /// Saving replaces `target` with the form values, keeping its enabled flag.
    Edit {
        target: RewriteRecord,
        form: RewriteForm,
    },
    Delete {
        target: RewriteRecord,
    },
}

impl Dialog {
    /// The backend call this dialog starts when submitted.
    pub fn operation(&self) -> Operation {
        match self {
            Dialog::Add(_) => Operation::Adding,
            Dialog::Edit { .. } => Operation::Updating,
            Dialog::Delete { .. } => Operation::Deleting,
        }
    }

    pub fn form(&self) -> Option<&RewriteForm> {
        match self {
            Dialog::Add(form) | Dialog::Edit { form, .. } => Some(form),
            Dialog::Delete { .. } => None,
        }
    }

    fn form_mut(&mut self) -> Option<&mut RewriteForm> {
        match self {
            Dialog::Add(form) | Dialog::Edit { form, .. } => Some(form),
            Dialog::Delete { .. } => None,
        }
    }
}

/// Controls of the open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogControls {
    /// Domain and answer inputs. Empty for the delete confirmation.
    pub inputs: Vec<Control>,
    /// Save button of a form, or the confirm button of a delete.
    pub submit: Control,
}

/// At most one dialog is open and it blocks the table underneath.
#[derive(Debug, Default)]
pub struct Modal {
    dialog: Option<Dialog>,
    error: Option<String>,
}

impl Modal {
    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    /// Inline error of the open dialog.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Renders the open dialog. Its submit control stays disabled while the
    /// dialog's own call is in flight, and a form's while a field is blank.
    pub fn controls(&self, busy: BusyFlags) -> Option<DialogControls> {
        let dialog = self.dialog.as_ref()?;
        let in_flight = busy.is_set(dialog.operation());

        Some(match dialog.form() {
            Some(form) => DialogControls {
                inputs: vec![
                    Control::new(controls::DOMAIN_INPUT, in_flight),
                    Control::new(controls::ANSWER_INPUT, in_flight),
                ],
                submit: Control::new(controls::SAVE_BUTTON, in_flight || !form.can_submit()),
            },
            None => DialogControls {
                inputs: Vec::new(),
                submit: Control::new(controls::DELETE_CONFIRM, in_flight),
            },
        })
    }

    pub fn open(&mut self, dialog: Dialog) {
        self.dialog = Some(dialog);
        self.error = None;
    }

    /// Discards the dialog and any edits in progress.
    pub fn close(&mut self) {
        self.dialog = None;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        if self.dialog.is_some() {
            self.error = Some(message.into());
        }
    }

    pub fn set_domain(&mut self, value: impl Into<String>) {
        if let Some(form) = self.dialog.as_mut().and_then(Dialog::form_mut) {
            form.domain = value.into();
        }
    }

    pub fn set_answer(&mut self, value: impl Into<String>) {
        if let Some(form) = self.dialog.as_mut().and_then(Dialog::form_mut) {
            form.answer = value.into();
        }
    }
}
