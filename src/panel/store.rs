use crate::common::{RewriteIdentity, RewriteRecord, RewriteSettings};

/// Backend calls that have their own busy indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Listing,
    Adding,
    Updating,
    Deleting,
    Configuring,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BusyFlags {
    pub listing: bool,
    pub adding: bool,
    pub updating: bool,
    pub deleting: bool,
    pub configuring: bool,
}

impl BusyFlags {
    fn flag_mut(&mut self, op: Operation) -> &mut bool {
        match op {
            Operation::Listing => &mut self.listing,
            Operation::Adding => &mut self.adding,
            Operation::Updating => &mut self.updating,
            Operation::Deleting => &mut self.deleting,
            Operation::Configuring => &mut self.configuring,
        }
    }

    pub fn is_set(&self, op: Operation) -> bool {
        match op {
            Operation::Listing => self.listing,
            Operation::Adding => self.adding,
            Operation::Updating => self.updating,
            Operation::Deleting => self.deleting,
            Operation::Configuring => self.configuring,
        }
    }
}

/// In-memory copy of the backend's rewrite list.
///
/// Busy flags only drive spinners and disabled controls. Nothing here
/// prevents a second call of the same kind while one is in flight.
#[derive(Debug, Default)]
pub struct ListStore {
    records: Vec<RewriteRecord>,
    settings: Option<RewriteSettings>,
    busy: BusyFlags,
    notice: Option<String>,
}

impl ListStore {
    pub fn records(&self) -> &[RewriteRecord] {
        &self.records
    }

    pub fn settings(&self) -> Option<RewriteSettings> {
        self.settings
    }

    pub fn busy(&self) -> BusyFlags {
        self.busy
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn find(&self, identity: &RewriteIdentity) -> Option<&RewriteRecord> {
        self.records.iter().find(|r| r.matches(identity))
    }

    pub fn begin(&mut self, op: Operation) {
        *self.busy.flag_mut(op) = true;
    }

    pub fn finish(&mut self, op: Operation) {
        *self.busy.flag_mut(op) = false;
    }

    pub(crate) fn reset_busy(&mut self) {
        self.busy = BusyFlags::default();
    }

    /// Swaps in a freshly listed collection, keeping backend order.
    pub fn replace(&mut self, records: Vec<RewriteRecord>) {
        self.records = records;
        self.notice = None;
    }

    pub fn set_settings(&mut self, settings: RewriteSettings) {
        self.settings = Some(settings);
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
