use std::cmp::Ordering;

use crate::common::RewriteRecord;

use super::controls::{self, Control};
use super::BusyFlags;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Domain,
    Answer,
}

impl Column {
    fn compare(&self, a: &RewriteRecord, b: &RewriteRecord) -> Ordering {
        match self {
            Column::Domain => a.domain.cmp(&b.domain),
            Column::Answer => a.answer.cmp(&b.answer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One rendered table row.
#[derive(Debug)]
pub struct Row<'a> {
    pub record: &'a RewriteRecord,
    pub toggle: Control,
    pub edit: Control,
    pub delete: Control,
}

#[derive(Debug)]
pub struct Page<'a> {
    pub rows: Vec<Row<'a>>,
    /// Opens the add dialog.
    pub add: Control,
    pub global_toggle: Control,
    /// Zero based.
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total: usize,
    pub loading: bool,
}

impl Page<'_> {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Sorting and pagination state of the rewrites table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    sort: Option<(Column, SortOrder)>,
    page: usize,
    page_size: usize,
}

impl Default for TableView {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl TableView {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            sort: None,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn sort(&self) -> Option<(Column, SortOrder)> {
        self.sort
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// A new column sorts ascending, the same column again flips the order.
    pub fn sort_by(&mut self, column: Column) {
        self.sort = Some(match self.sort {
            Some((current, SortOrder::Ascending)) if current == column => {
                (column, SortOrder::Descending)
            }
            _ => (column, SortOrder::Ascending),
        });
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 0;
    }

    pub fn page_count(&self, total: usize) -> usize {
        if total == 0 {
            1
        } else {
            total.div_ceil(self.page_size)
        }
    }

    pub fn add_button(&self, busy: BusyFlags) -> Control {
        Control::new(controls::ADD_REWRITE, busy.adding)
    }

    /// Global switch in the table header.
    pub fn global_toggle(&self, busy: BusyFlags) -> Control {
        Control::new(controls::GLOBAL_TOGGLE, busy.configuring)
    }

    pub fn render<'a>(&self, records: &'a [RewriteRecord], busy: BusyFlags) -> Page<'a> {
        let mut sorted: Vec<&RewriteRecord> = records.iter().collect();
        if let Some((column, order)) = self.sort {
            // sort_by is stable, equal keys keep the store order.
            sorted.sort_by(|a, b| match order {
                SortOrder::Ascending => column.compare(a, b),
                SortOrder::Descending => column.compare(b, a),
            });
        }

        let total = sorted.len();
        let page_count = self.page_count(total);
        let page = self.page.min(page_count - 1);
        let start = page * self.page_size;
        let end = (start + self.page_size).min(total);

        let rows = sorted[start..end]
            .iter()
            .map(|&record| Row {
                record,
                toggle: Control::new(controls::row_toggle(&record.domain), busy.updating),
                edit: Control::new(controls::row_edit(&record.domain), busy.updating),
                delete: Control::new(controls::row_delete(&record.domain), busy.deleting),
            })
            .collect();

        Page {
            rows,
            add: self.add_button(busy),
            global_toggle: self.global_toggle(busy),
            page,
            page_count,
            page_size: self.page_size,
            total,
            loading: busy.listing || busy.adding || busy.deleting,
        }
    }
}
