//! The activity record and its fixed column layout.

use serde::{Deserialize, Serialize};

pub const COL_EMPLOYEE_CODE: &str = "Employee Code";
pub const COL_FULL_NAME: &str = "Full Name";
pub const COL_SAP_USAGE: &str = "SAP Usage";
pub const COL_SAP_USERNAME: &str = "SAP/ECC Username";
pub const COL_ACTIVITY_NAME: &str = "Activity Name";
pub const COL_DESCRIPTION: &str = "Description of Activity";
pub const COL_FREQUENCY: &str = "Frequency";
pub const COL_AVG_MINUTES: &str = "Avg. Time per Instance (mins)";
pub const COL_IS_CORE: &str = "Is this core?";
pub const COL_AUTOMATABLE: &str = "Can be automated?";

/// Column order of the submissions file. Writers must emit exactly this order.
pub const SUBMISSION_COLUMNS: [&str; 10] = [
    COL_EMPLOYEE_CODE,
    COL_FULL_NAME,
    COL_SAP_USAGE,
    COL_SAP_USERNAME,
    COL_ACTIVITY_NAME,
    COL_DESCRIPTION,
    COL_FREQUENCY,
    COL_AVG_MINUTES,
    COL_IS_CORE,
    COL_AUTOMATABLE,
];

/// Columns shown to an employee on their own dashboard.
pub const ACTIVITY_COLUMNS: [&str; 6] = [
    COL_ACTIVITY_NAME,
    COL_DESCRIPTION,
    COL_FREQUENCY,
    COL_AVG_MINUTES,
    COL_IS_CORE,
    COL_AUTOMATABLE,
];

pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SapUsage {
    #[default]
    #[serde(rename = "No")]
    None,
    #[serde(rename = "Yes- ECC")]
    Ecc,
    #[serde(rename = "Yes- HANA")]
    Hana,
}

impl SapUsage {
    pub const ALL: [SapUsage; 3] = [SapUsage::None, SapUsage::Ecc, SapUsage::Hana];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "No",
            Self::Ecc => "Yes- ECC",
            Self::Hana => "Yes- HANA",
        }
    }

    pub fn uses_sap(self) -> bool {
        self != Self::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    #[serde(rename = "Ad-hoc")]
    AdHoc,
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::AdHoc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::AdHoc => "Ad-hoc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoreActivity {
    #[default]
    Yes,
    No,
}

impl CoreActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Automatable {
    #[default]
    Yes,
    No,
    Maybe,
}

impl Automatable {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Maybe => "Maybe",
        }
    }
}

/// One logged activity. Built from a submitted form and appended as one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub employee_code: String,
    pub full_name: String,
    pub sap_usage: SapUsage,
    pub sap_username: String,
    pub activity_name: String,
    pub description: String,
    pub frequency: Frequency,
    pub avg_minutes: u32,
    pub is_core: CoreActivity,
    pub automatable: Automatable,
}

impl ActivityRecord {
    /// Cells in [`SUBMISSION_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.employee_code.clone(),
            self.full_name.clone(),
            self.sap_usage.as_str().to_string(),
            self.sap_username.clone(),
            self.activity_name.clone(),
            self.description.clone(),
            self.frequency.as_str().to_string(),
            self.avg_minutes.to_string(),
            self.is_core.as_str().to_string(),
            self.automatable.as_str().to_string(),
        ]
    }
}
