//! Main-form draft: shared employee details plus an ordered list of activity
//! rows, each addressable by a stable id.

use serde::{Deserialize, Serialize};

use crate::config::FormConfig;
use crate::error::{AppError, Result};
use crate::record::{
    ActivityRecord, Automatable, CoreActivity, Frequency, SapUsage, NOT_APPLICABLE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityRow {
    pub id: RowId,
    pub activity_name: String,
    pub description: String,
    pub frequency: Frequency,
    pub avg_minutes: u32,
    pub is_core: CoreActivity,
    pub automatable: Automatable,
}

impl Default for ActivityRow {
    fn default() -> Self {
        Self::new(RowId(0))
    }
}

impl ActivityRow {
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            activity_name: String::new(),
            description: String::new(),
            frequency: Frequency::default(),
            avg_minutes: 0,
            is_core: CoreActivity::default(),
            automatable: Automatable::default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.activity_name.trim().is_empty()
    }
}

/// Field changes for a single row. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowUpdate {
    pub activity_name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub avg_minutes: Option<u32>,
    pub is_core: Option<CoreActivity>,
    pub automatable: Option<Automatable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityForm {
    pub employee_code: String,
    pub full_name: String,
    pub sap_usage: SapUsage,
    pub sap_username: String,
    pub rows: Vec<ActivityRow>,
    #[serde(skip_deserializing)]
    next_row_id: u32,
}

impl Default for ActivityForm {
    fn default() -> Self {
        let mut form = Self {
            employee_code: String::new(),
            full_name: String::new(),
            sap_usage: SapUsage::None,
            sap_username: String::new(),
            rows: Vec::new(),
            next_row_id: 0,
        };
        form.push_row();
        form
    }
}

/// Validated records ready to append, plus how many blank rows were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub records: Vec<ActivityRecord>,
    pub discarded_rows: usize,
}

impl ActivityForm {
    pub fn activity_count(&self) -> usize {
        self.rows.len()
    }

    /// Activity rows are only offered once the employee is identified.
    pub fn rows_visible(&self) -> bool {
        !self.employee_code.trim().is_empty() && !self.full_name.trim().is_empty()
    }

    pub fn sap_username_visible(&self) -> bool {
        self.sap_usage.uses_sap()
    }

    /// Resize to `count` (clamped to the configured bounds). Existing rows keep
    /// their ids and contents; new rows get fresh ids.
    pub fn set_activity_count(&mut self, count: usize, limits: &FormConfig) -> usize {
        let count = limits.clamp(count);
        self.rows.truncate(count);
        while self.rows.len() < count {
            self.push_row();
        }
        count
    }

    pub fn row(&self, id: RowId) -> Option<&ActivityRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn update_row(&mut self, id: RowId, update: RowUpdate) -> Result<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| AppError::validation("rows", format!("Unknown activity row {}.", id.0)))?;
        if let Some(value) = update.activity_name {
            row.activity_name = value;
        }
        if let Some(value) = update.description {
            row.description = value;
        }
        if let Some(value) = update.frequency {
            row.frequency = value;
        }
        if let Some(value) = update.avg_minutes {
            row.avg_minutes = value;
        }
        if let Some(value) = update.is_core {
            row.is_core = value;
        }
        if let Some(value) = update.automatable {
            row.automatable = value;
        }
        Ok(())
    }

    /// Replace the draft with a submitted copy. Row ids are reassigned here so
    /// client-supplied ids never reach the id counter.
    pub fn replace_with(&mut self, submitted: ActivityForm, limits: &FormConfig) {
        self.employee_code = submitted.employee_code;
        self.full_name = submitted.full_name;
        self.sap_usage = submitted.sap_usage;
        self.sap_username = submitted.sap_username;
        self.rows = submitted.rows;
        self.rows.truncate(limits.max_activities);
        self.next_row_id = 0;
        for row in &mut self.rows {
            row.id = RowId(self.next_row_id);
            self.next_row_id += 1;
        }
        while self.rows.len() < limits.min_activities {
            self.push_row();
        }
    }

    /// Check the shared fields, drop blank rows and build the records.
    ///
    /// Returns a validation error when the employee details are incomplete.
    /// A submission where every row is blank is returned with no records.
    pub fn assemble(&self) -> Result<Submission> {
        let employee_code = self.employee_code.trim();
        let full_name = self.full_name.trim();
        if employee_code.is_empty() {
            return Err(AppError::validation(
                "employee_code",
                "Please enter your Employee Code.",
            ));
        }
        if full_name.is_empty() {
            return Err(AppError::validation("full_name", "Please enter your Full Name."));
        }
        let sap_username = if self.sap_usage.uses_sap() {
            let name = self.sap_username.trim();
            if name.is_empty() {
                return Err(AppError::validation(
                    "sap_username",
                    "Please enter your SAP/ECC User Name.",
                ));
            }
            name.to_string()
        } else {
            NOT_APPLICABLE.to_string()
        };

        let records: Vec<ActivityRecord> = self
            .rows
            .iter()
            .filter(|row| !row.is_blank())
            .map(|row| ActivityRecord {
                employee_code: employee_code.to_string(),
                full_name: full_name.to_string(),
                sap_usage: self.sap_usage,
                sap_username: sap_username.clone(),
                activity_name: row.activity_name.trim().to_string(),
                description: row.description.clone(),
                frequency: row.frequency,
                avg_minutes: row.avg_minutes,
                is_core: row.is_core,
                automatable: row.automatable,
            })
            .collect();
        Ok(Submission {
            discarded_rows: self.rows.len() - records.len(),
            records,
        })
    }

    fn push_row(&mut self) {
        self.rows.push(ActivityRow::new(RowId(self.next_row_id)));
        self.next_row_id = self.next_row_id.wrapping_add(1);
    }
}
