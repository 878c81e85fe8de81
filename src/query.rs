/// Read-only projections over the clinic document.
///
/// Everything here derives a view (filtered, sorted, joined) without
/// mutating anything. Record lookup is a linear scan, which is fine at
/// clinic dataset sizes.
use std::cmp::Reverse;

use chrono::{DateTime, Local, NaiveDate};

use crate::models::{
    Appointment, ApptStatus, BillStatus, ClinicDocument, Doctor, Patient, PatientProfile,
};

/// Placeholder shown for a dangling reference or an absent value.
pub const MISSING: &str = "—";

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub patients: usize,
    pub doctors: usize,
    pub upcoming_appts: usize,
}

/// Count patients, doctors and appointments strictly in the future of `now`.
pub fn stats(doc: &ClinicDocument, now: DateTime<Local>) -> Stats {
    Stats {
        patients: doc.patients.len(),
        doctors: doc.doctors.len(),
        upcoming_appts: doc.appts.iter().filter(|a| a.datetime > now).count(),
    }
}

pub fn find_patient<'a>(doc: &'a ClinicDocument, id: &str) -> Option<&'a Patient> {
    doc.patients.iter().find(|p| p.id == id)
}

pub fn find_doctor<'a>(doc: &'a ClinicDocument, id: &str) -> Option<&'a Doctor> {
    doc.doctors.iter().find(|d| d.id == id)
}

fn patient_name(doc: &ClinicDocument, id: &str) -> String {
    find_patient(doc, id).map_or_else(|| MISSING.to_string(), |p| p.name.clone())
}

fn doctor_name(doc: &ClinicDocument, id: &str) -> String {
    find_doctor(doc, id).map_or_else(|| MISSING.to_string(), |d| d.name.clone())
}

/// An appointment with its references resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ApptRow {
    pub id: String,
    pub patient: String,
    pub doctor: String,
    pub datetime: DateTime<Local>,
    pub status: ApptStatus,
}

fn appt_row(doc: &ClinicDocument, appt: &Appointment) -> ApptRow {
    ApptRow {
        id: appt.id.clone(),
        patient: patient_name(doc, &appt.patient_id),
        doctor: doctor_name(doc, &appt.doctor_id),
        datetime: appt.datetime,
        status: appt.status,
    }
}

/// The six most recent appointments, newest first.
pub fn recent_appointments(doc: &ClinicDocument) -> Vec<ApptRow> {
    let mut appts: Vec<&Appointment> = doc.appts.iter().collect();
    appts.sort_by_key(|a| Reverse(a.datetime));
    appts
        .into_iter()
        .take(6)
        .map(|a| appt_row(doc, a))
        .collect()
}

/// Patients whose name or phone contains the filter, case-insensitively.
/// An empty filter returns everyone.
pub fn filtered_patients<'a>(doc: &'a ClinicDocument, filter: &str) -> Vec<&'a Patient> {
    let needle = filter.to_lowercase();
    doc.patients
        .iter()
        .filter(|p| format!("{}{}", p.name, p.phone).to_lowercase().contains(&needle))
        .collect()
}

/// Doctors whose name, specialty or phone contains the filter.
pub fn filtered_doctors<'a>(doc: &'a ClinicDocument, filter: &str) -> Vec<&'a Doctor> {
    let needle = filter.to_lowercase();
    doc.doctors
        .iter()
        .filter(|d| {
            format!("{}{}{}", d.name, d.specialty, d.phone)
                .to_lowercase()
                .contains(&needle)
        })
        .collect()
}

/// One (id, label) pair per doctor, for the doctor selection control.
pub fn doctor_options(doc: &ClinicDocument) -> Vec<(String, String)> {
    doc.doctors
        .iter()
        .map(|d| (d.id.clone(), format!("{} — {}", d.name, d.specialty)))
        .collect()
}

/// Appointments matching an optional doctor and an optional calendar date.
/// Both filters combine with AND; passing neither returns the full list in
/// stored order.
pub fn filtered_appointments(
    doc: &ClinicDocument,
    doctor_id: Option<&str>,
    date: Option<NaiveDate>,
) -> Vec<ApptRow> {
    doc.appts
        .iter()
        .filter(|a| doctor_id.map_or(true, |id| a.doctor_id == id))
        .filter(|a| date.map_or(true, |d| a.datetime.date_naive() == d))
        .map(|a| appt_row(doc, a))
        .collect()
}

/// A billing record with the patient name and display currency resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingRow {
    pub patient: String,
    pub amount: f64,
    pub currency: String,
    pub date: DateTime<Local>,
    pub status: BillStatus,
}

/// All billing records in stored order.
pub fn billing_rows(doc: &ClinicDocument) -> Vec<BillingRow> {
    doc.billing
        .iter()
        .map(|b| BillingRow {
            patient: patient_name(doc, &b.patient_id),
            amount: b.amount,
            currency: doc.settings.currency.clone(),
            date: b.date,
            status: b.status,
        })
        .collect()
}

/// Profiles whose name, mobile or district contains the filter.
pub fn filtered_profiles<'a>(
    profiles: &'a [PatientProfile],
    filter: &str,
) -> Vec<&'a PatientProfile> {
    let needle = filter.to_lowercase();
    profiles
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.mobile.contains(&needle)
                || p.district.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Where a global search should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Patients,
    Doctors,
}

/// Pick the page to jump to for a search query: patients win over doctors,
/// no match goes nowhere.
pub fn global_search(doc: &ClinicDocument, query: &str) -> Option<SearchTarget> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let patient_hit = doc
        .patients
        .iter()
        .any(|p| format!("{}{}", p.name, p.phone).to_lowercase().contains(&needle));
    if patient_hit {
        return Some(SearchTarget::Patients);
    }
    let doctor_hit = doc
        .doctors
        .iter()
        .any(|d| format!("{}{}", d.name, d.specialty).to_lowercase().contains(&needle));
    doctor_hit.then_some(SearchTarget::Doctors)
}
