/// Data models for the clinic management system.
///
/// This module defines the record types held in the clinic document:
/// - Patient, Doctor: the people the clinic tracks
/// - Appointment: links a patient and a doctor at a point in time
/// - BillingRecord, InventoryItem: money and stock
/// - Settings: clinic-wide display settings
/// - ClinicDocument: the root structure, the unit of persistence
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a short record identifier: the given prefix followed by seven
/// hex characters drawn from a random UUID. Not a persistent counter;
/// collisions are negligible at clinic dataset sizes.
pub fn uid(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &hex[..7])
}

/// Lifecycle states of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApptStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl ApptStatus {
    /// Convert a string to an appointment status. Returns None for
    /// anything unrecognised; callers pick their own fallback.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "scheduled" => Some(ApptStatus::Scheduled),
            "completed" => Some(ApptStatus::Completed),
            "cancelled" => Some(ApptStatus::Cancelled),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ApptStatus::Scheduled => "Scheduled",
            ApptStatus::Completed => "Completed",
            ApptStatus::Cancelled => "Cancelled",
        }
    }
}

/// Payment states of a billing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    Paid,
    Unpaid,
}

impl BillStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "paid" => Some(BillStatus::Paid),
            "unpaid" => Some(BillStatus::Unpaid),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BillStatus::Paid => "Paid",
            BillStatus::Unpaid => "Unpaid",
        }
    }
}

/// A registered patient. The id never changes once the record is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub age: u32,
    pub sex: String,
}

/// A doctor on the clinic's roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub phone: String,
}

/// One appointment. The patient and doctor ids should reference existing
/// records, but dangling references are tolerated and rendered as a
/// placeholder; only cascade deletes clean them up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub datetime: DateTime<Local>,
    pub status: ApptStatus,
}

/// An invoice issued to a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
    pub id: String,
    pub patient_id: String,
    pub amount: f64,
    pub date: DateTime<Local>,
    pub status: BillStatus,
}

/// A stock item. Expiry is free-form and optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryItem {
    pub id: String,
    pub item: String,
    pub qty: u32,
    pub expiry: Option<String>,
}

/// Clinic-wide settings. Always present in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub name: String,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            name: "HealCare Clinic".to_string(),
            currency: "INR".to_string(),
        }
    }
}

/// The root document: every collection the clinic persists, as one unit.
/// Individual fields default independently, so a well-formed document with
/// missing keys still loads; a document that fails to parse at all is
/// replaced wholesale by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicDocument {
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub appts: Vec<Appointment>,
    pub billing: Vec<BillingRecord>,
    pub inventory: Vec<InventoryItem>,
    pub settings: Settings,
}

/// A free-form patient profile from the registration flow. Stored in its
/// own slot; this program only reads and displays them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientProfile {
    pub name: String,
    pub mobile: String,
    pub dob: String,
    pub gender: String,
    pub district: String,
    pub city: String,
    pub email: String,
    pub blood: String,
}

/// A feedback entry. Entries have no id; their position in the list is
/// the deletion key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackEntry {
    pub user: String,
    pub text: String,
    pub date: String,
}
