use std::collections::VecDeque;

use crate::common::{Result, RewriteBackend, RewriteIdentity, RewriteRecord, RewriteSettings};

use super::{
    stored_page_size, Column, Dialog, DialogControls, ListStore, Modal, Operation, Page,
    PreferenceStore, RewriteForm, TableView, PAGE_SIZE_KEY,
};

/// User intents reported by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mount,
    Unmount,
    Refresh,
    OpenAdd,
    OpenEdit(RewriteIdentity),
    OpenDelete(RewriteIdentity),
    CloseModal,
    SetDomain(String),
    SetAnswer(String),
    Submit,
    ConfirmDelete,
    Toggle(RewriteIdentity),
    ToggleAll,
    SortBy(Column),
    SetPage(usize),
    SetPageSize(usize),
}

/// A backend call requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    List,
    LoadSettings,
    Create(RewriteRecord),
    Update {
        target: RewriteIdentity,
        record: RewriteRecord,
        /// Raised from a row toggle rather than the edit dialog.
        inline: bool,
    },
    Delete(RewriteIdentity),
    SaveSettings(RewriteSettings),
}

/// What an [`Effect`] produced, to be fed back through
/// [`PageController::complete`].
#[derive(Debug)]
pub enum Outcome {
    Listed(Result<Vec<RewriteRecord>>),
    SettingsLoaded(Result<RewriteSettings>),
    Created(Result<RewriteRecord>),
    Updated {
        result: Result<RewriteRecord>,
        inline: bool,
    },
    Deleted(Result<()>),
    SettingsSaved(Result<RewriteSettings>),
}

impl Effect {
    pub fn operation(&self) -> Operation {
        match self {
            Effect::List => Operation::Listing,
            Effect::Create(_) => Operation::Adding,
            Effect::Update { .. } => Operation::Updating,
            Effect::Delete(_) => Operation::Deleting,
            Effect::LoadSettings | Effect::SaveSettings(_) => Operation::Configuring,
        }
    }

    pub fn execute(self, backend: &mut impl RewriteBackend) -> Outcome {
        let request_id = uuid::Uuid::new_v4();
        tracing::debug!(request_id = %request_id, effect = ?self, "Executing effect");

        let outcome = match self {
            Effect::List => Outcome::Listed(backend.list()),
            Effect::LoadSettings => Outcome::SettingsLoaded(backend.settings()),
            Effect::Create(record) => Outcome::Created(backend.create(&record)),
            Effect::Update {
                target,
                record,
                inline,
            } => Outcome::Updated {
                result: backend.update(&target, &record),
                inline,
            },
            Effect::Delete(target) => Outcome::Deleted(backend.delete(&target)),
            Effect::SaveSettings(settings) => {
                Outcome::SettingsSaved(backend.set_settings(settings).map(|()| settings))
            }
        };

        if let Some(err) = outcome.error() {
            tracing::warn!(request_id = %request_id, error = %err, "Effect failed");
        }
        outcome
    }
}

impl Outcome {
    fn operation(&self) -> Operation {
        match self {
            Outcome::Listed(_) => Operation::Listing,
            Outcome::Created(_) => Operation::Adding,
            Outcome::Updated { .. } => Operation::Updating,
            Outcome::Deleted(_) => Operation::Deleting,
            Outcome::SettingsLoaded(_) | Outcome::SettingsSaved(_) => Operation::Configuring,
        }
    }

    pub fn error(&self) -> Option<&crate::common::Error> {
        match self {
            Outcome::Listed(r) => r.as_ref().err(),
            Outcome::SettingsLoaded(r) | Outcome::SettingsSaved(r) => r.as_ref().err(),
            Outcome::Created(r) | Outcome::Updated { result: r, .. } => r.as_ref().err(),
            Outcome::Deleted(r) => r.as_ref().err(),
        }
    }
}

/// One mount of the page. Calls issued under an earlier mount are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountId(u64);

/// Coordinates the rewrites page.
///
/// [`handle`](Self::handle) turns a command into UI state changes plus the
/// backend calls it needs. Each call is in flight until its outcome is passed
/// to [`complete`](Self::complete) together with the [`MountId`] it was issued
/// under, which may ask for a follow-up re-fetch.
/// [`dispatch`](Self::dispatch) drives that loop synchronously.
pub struct PageController<P: PreferenceStore> {
    store: ListStore,
    table: TableView,
    modal: Modal,
    target: Option<RewriteRecord>,
    preferences: P,
    mounts: u64,
    mount: Option<MountId>,
}

impl<P: PreferenceStore> PageController<P> {
    pub fn new(preferences: P) -> Self {
        Self {
            store: ListStore::default(),
            table: TableView::with_page_size(stored_page_size(&preferences)),
            modal: Modal::default(),
            target: None,
            preferences,
            mounts: 0,
            mount: None,
        }
    }

    pub fn store(&self) -> &ListStore {
        &self.store
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// The record the open edit or delete dialog was opened for.
    pub fn target(&self) -> Option<&RewriteRecord> {
        self.target.as_ref()
    }

    /// The current mount, `None` before the first mount and after unmount.
    pub fn mount_id(&self) -> Option<MountId> {
        self.mount
    }

    pub fn page(&self) -> Page<'_> {
        self.table.render(self.store.records(), self.store.busy())
    }

    pub fn dialog_controls(&self) -> Option<DialogControls> {
        self.modal.controls(self.store.busy())
    }

    /// Whether the open dialog's own call is still in flight.
    fn dialog_busy(&self) -> bool {
        self.modal
            .dialog()
            .is_some_and(|dialog| self.store.busy().is_set(dialog.operation()))
    }

    fn request(&mut self, effect: Effect) -> Vec<Effect> {
        self.store.begin(effect.operation());
        vec![effect]
    }

    fn close_modal(&mut self) {
        self.modal.close();
        self.target = None;
    }

    fn open_for(&mut self, identity: &RewriteIdentity, delete: bool) {
        let Some(record) = self.store.find(identity).cloned() else {
            tracing::warn!(rewrite = %identity, "No such rewrite in the current list");
            return;
        };
        let dialog = if delete {
            Dialog::Delete {
                target: record.clone(),
            }
        } else {
            Dialog::Edit {
                form: RewriteForm::from_record(&record),
                target: record.clone(),
            }
        };
        self.target = Some(record);
        self.modal.open(dialog);
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.dialog_busy() {
            tracing::debug!("Ignoring submit while the previous one is in flight");
            return Vec::new();
        }
        let effect = match self.modal.dialog() {
            Some(Dialog::Add(form)) => form.to_record(true).map(Effect::Create),
            Some(Dialog::Edit { target, form }) => {
                form.to_record(target.enabled).map(|record| Effect::Update {
                    target: target.identity(),
                    record,
                    inline: false,
                })
            }
            _ => return Vec::new(),
        };
        match effect {
            Ok(effect) => self.request(effect),
            Err(err) => {
                self.modal.fail(err.to_string());
                Vec::new()
            }
        }
    }

    fn confirm_delete(&mut self) -> Vec<Effect> {
        if self.dialog_busy() {
            tracing::debug!("Ignoring delete confirmation while one is in flight");
            return Vec::new();
        }
        match self.modal.dialog() {
            Some(Dialog::Delete { target }) => {
                let identity = target.identity();
                self.request(Effect::Delete(identity))
            }
            _ => Vec::new(),
        }
    }

    fn toggle(&mut self, identity: &RewriteIdentity) -> Vec<Effect> {
        // The flag is taken from the stored record at toggle time, not re-fetched.
        match self.store.find(identity) {
            Some(record) => {
                let record = record.toggled();
                self.request(Effect::Update {
                    target: identity.clone(),
                    record,
                    inline: true,
                })
            }
            None => {
                tracing::warn!(rewrite = %identity, "No such rewrite in the current list");
                Vec::new()
            }
        }
    }

    fn set_page_size(&mut self, size: usize) {
        self.table.set_page_size(size);
        let size = self.table.page_size();
        if let Err(err) = self.preferences.set(PAGE_SIZE_KEY, size.into()) {
            tracing::warn!(error = %err, "Failed to persist page size");
            self.store.set_notice(err.to_string());
        }
    }

    pub fn handle(&mut self, command: Command) -> Vec<Effect> {
        tracing::debug!(command = ?command, "Handling command");

        match command {
            Command::Mount => {
                self.mounts += 1;
                self.mount = Some(MountId(self.mounts));
                self.store.reset_busy();
                let mut effects = self.request(Effect::List);
                effects.extend(self.request(Effect::LoadSettings));
                effects
            }
            Command::Unmount => {
                self.mount = None;
                self.close_modal();
                Vec::new()
            }
            Command::Refresh => {
                self.store.clear_notice();
                self.request(Effect::List)
            }
            Command::OpenAdd => {
                self.target = None;
                self.modal.open(Dialog::Add(RewriteForm::default()));
                Vec::new()
            }
            Command::OpenEdit(identity) => {
                self.open_for(&identity, false);
                Vec::new()
            }
            Command::OpenDelete(identity) => {
                self.open_for(&identity, true);
                Vec::new()
            }
            Command::CloseModal => {
                self.close_modal();
                Vec::new()
            }
            Command::SetDomain(value) => {
                self.modal.set_domain(value);
                Vec::new()
            }
            Command::SetAnswer(value) => {
                self.modal.set_answer(value);
                Vec::new()
            }
            Command::Submit => self.submit(),
            Command::ConfirmDelete => self.confirm_delete(),
            Command::Toggle(identity) => self.toggle(&identity),
            Command::ToggleAll => {
                // Unknown state is treated as enabled, the backend default.
                let enabled = self.store.settings().map_or(true, |s| s.enabled);
                self.request(Effect::SaveSettings(RewriteSettings { enabled: !enabled }))
            }
            Command::SortBy(column) => {
                self.table.sort_by(column);
                Vec::new()
            }
            Command::SetPage(page) => {
                self.table.set_page(page);
                Vec::new()
            }
            Command::SetPageSize(size) => {
                self.set_page_size(size);
                Vec::new()
            }
        }
    }

    /// Applies the outcome of an effect issued under `mount`. Returns
    /// follow-up effects.
    pub fn complete(&mut self, mount: MountId, outcome: Outcome) -> Vec<Effect> {
        if self.mount != Some(mount) {
            tracing::debug!(outcome = ?outcome, "Dropping outcome for a discarded page");
            return Vec::new();
        }

        self.store.finish(outcome.operation());

        match outcome {
            Outcome::Listed(Ok(records)) => {
                self.store.replace(records);
                Vec::new()
            }
            Outcome::Listed(Err(err)) => {
                self.store
                    .set_notice(format!("Failed to load rewrites: {err}"));
                Vec::new()
            }
            Outcome::SettingsLoaded(Ok(settings)) | Outcome::SettingsSaved(Ok(settings)) => {
                self.store.set_settings(settings);
                Vec::new()
            }
            Outcome::SettingsLoaded(Err(err)) => {
                self.store
                    .set_notice(format!("Failed to load rewrite settings: {err}"));
                Vec::new()
            }
            Outcome::SettingsSaved(Err(err)) => {
                self.store
                    .set_notice(format!("Failed to update rewrite settings: {err}"));
                Vec::new()
            }
            Outcome::Created(Ok(_))
            | Outcome::Updated {
                result: Ok(_),
                inline: false,
            } => {
                self.close_modal();
                self.request(Effect::List)
            }
            Outcome::Updated {
                result: Ok(_),
                inline: true,
            } => self.request(Effect::List),
            Outcome::Deleted(result) => match result {
                Err(err) if !err.is_not_found() => {
                    self.modal.fail(err.to_string());
                    Vec::new()
                }
                // Already gone counts as deleted.
                _ => {
                    self.close_modal();
                    self.request(Effect::List)
                }
            },
            Outcome::Updated {
                result: Err(err),
                inline: true,
            } => {
                self.store
                    .set_notice(format!("Failed to toggle rewrite: {err}"));
                Vec::new()
            }
            Outcome::Created(Err(err))
            | Outcome::Updated {
                result: Err(err),
                inline: false,
            } => {
                self.modal.fail(err.to_string());
                Vec::new()
            }
        }
    }

    /// Handles a command and runs every resulting call against the backend
    /// until nothing is left in flight.
    pub fn dispatch(&mut self, command: Command, backend: &mut impl RewriteBackend) {
        let mut pending: VecDeque<Effect> = self.handle(command).into();
        let Some(mount) = self.mount else {
            if !pending.is_empty() {
                tracing::debug!("Page is not mounted, skipping backend calls");
            }
            return;
        };
        while let Some(effect) = pending.pop_front() {
            let outcome = effect.execute(backend);
            pending.extend(self.complete(mount, outcome));
        }
    }
}
