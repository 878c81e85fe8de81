/// Entity commands: the mutating half of the application.
///
/// `ClinicService` owns the loaded document, the sibling collections and
/// the store. Every mutation is followed by a full-document write. Create
/// commands substitute fixed fallbacks for empty or unparsable input;
/// edit and delete commands treat an unknown id as a silent no-op.
/// Interactive confirmation for deletes happens in the menu layer, so a
/// declined delete never reaches this service.
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use log::debug;

use crate::forms::FormValues;
use crate::models::{
    uid, Appointment, ApptStatus, BillStatus, BillingRecord, ClinicDocument, Doctor, FeedbackEntry,
    InventoryItem, Patient, PatientProfile,
};
use crate::seed;
use crate::store::{Store, StoreError};

fn non_empty(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Numeric form input; anything unparsable counts as zero.
fn number_or_zero<T: FromStr + Default>(value: &str) -> T {
    value.trim().parse().unwrap_or_default()
}

/// Parse "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (midnight); anything else
/// falls back to the current time rather than rejecting the record.
fn parse_datetime(value: &str) -> DateTime<Local> {
    let value = value.trim();
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    naive
        .and_then(|n| Local.from_local_datetime(&n).earliest())
        .unwrap_or_else(Local::now)
}

pub struct ClinicService {
    store: Store,
    pub doc: ClinicDocument,
    pub profiles: Vec<PatientProfile>,
    pub feedback: Vec<FeedbackEntry>,
}

impl ClinicService {
    /// Load everything the store holds. Corrupt slots have already healed
    /// to defaults by the time this returns.
    pub fn open(store: Store) -> Result<Self, StoreError> {
        let doc = store.load_state()?;
        let profiles = store.load_profiles()?;
        let feedback = store.load_feedback()?;
        Ok(ClinicService {
            store,
            doc,
            profiles,
            feedback,
        })
    }

    /// Seed the demo dataset when the patient collection is empty,
    /// persisting immediately. Returns whether it seeded.
    pub fn seed_demo_data(&mut self) -> Result<bool, StoreError> {
        if seed::seed_if_empty(&mut self.doc) {
            self.persist()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save_state(&self.doc)
    }

    // --- session -------------------------------------------------------

    pub fn session(&self) -> Option<String> {
        self.store.session()
    }

    pub fn login(&self, user: &str) -> Result<(), StoreError> {
        self.store.set_session(user)
    }

    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear_session()
    }

    // --- patients ------------------------------------------------------

    pub fn create_patient(&mut self, input: &FormValues) -> Result<String, StoreError> {
        let patient = Patient {
            id: uid("p"),
            name: non_empty(input.get("name"), "Unknown"),
            phone: input.get("phone").trim().to_string(),
            age: number_or_zero(input.get("age")),
            sex: input.get("sex").trim().to_string(),
        };
        let id = patient.id.clone();
        debug!("created patient {id}");
        self.doc.patients.push(patient);
        self.persist()?;
        Ok(id)
    }

    pub fn edit_patient(&mut self, id: &str, input: &FormValues) -> Result<bool, StoreError> {
        let Some(patient) = self.doc.patients.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        patient.name = input.get("name").trim().to_string();
        patient.phone = input.get("phone").trim().to_string();
        patient.age = number_or_zero(input.get("age"));
        patient.sex = input.get("sex").trim().to_string();
        self.persist()?;
        Ok(true)
    }

    /// Remove a patient along with their appointments and billing records.
    pub fn delete_patient(&mut self, id: &str) -> Result<(), StoreError> {
        self.doc.patients.retain(|p| p.id != id);
        self.doc.appts.retain(|a| a.patient_id != id);
        self.doc.billing.retain(|b| b.patient_id != id);
        debug!("deleted patient {id} with dependents");
        self.persist()
    }

    // --- doctors -------------------------------------------------------

    pub fn create_doctor(&mut self, input: &FormValues) -> Result<String, StoreError> {
        let doctor = Doctor {
            id: uid("d"),
            name: non_empty(input.get("name"), "Dr. Unknown"),
            specialty: non_empty(input.get("specialty"), "General"),
            phone: input.get("phone").trim().to_string(),
        };
        let id = doctor.id.clone();
        debug!("created doctor {id}");
        self.doc.doctors.push(doctor);
        self.persist()?;
        Ok(id)
    }

    pub fn edit_doctor(&mut self, id: &str, input: &FormValues) -> Result<bool, StoreError> {
        let Some(doctor) = self.doc.doctors.iter_mut().find(|d| d.id == id) else {
            return Ok(false);
        };
        doctor.name = input.get("name").trim().to_string();
        doctor.specialty = input.get("specialty").trim().to_string();
        doctor.phone = input.get("phone").trim().to_string();
        self.persist()?;
        Ok(true)
    }

    /// Remove a doctor along with their appointments.
    pub fn delete_doctor(&mut self, id: &str) -> Result<(), StoreError> {
        self.doc.doctors.retain(|d| d.id != id);
        self.doc.appts.retain(|a| a.doctor_id != id);
        debug!("deleted doctor {id} with appointments");
        self.persist()
    }

    // --- appointments --------------------------------------------------

    pub fn create_appointment(&mut self, input: &FormValues) -> Result<String, StoreError> {
        let appt = Appointment {
            id: uid("a"),
            patient_id: input.get("patient").trim().to_string(),
            doctor_id: input.get("doctor").trim().to_string(),
            datetime: parse_datetime(input.get("datetime")),
            status: ApptStatus::parse(input.get("status")).unwrap_or(ApptStatus::Scheduled),
        };
        let id = appt.id.clone();
        debug!("created appointment {id}");
        self.doc.appts.push(appt);
        self.persist()?;
        Ok(id)
    }

    pub fn edit_appointment(&mut self, id: &str, input: &FormValues) -> Result<bool, StoreError> {
        let Some(appt) = self.doc.appts.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };
        appt.patient_id = input.get("patient").trim().to_string();
        appt.doctor_id = input.get("doctor").trim().to_string();
        appt.datetime = parse_datetime(input.get("datetime"));
        appt.status = ApptStatus::parse(input.get("status")).unwrap_or(ApptStatus::Scheduled);
        self.persist()?;
        Ok(true)
    }

    pub fn delete_appointment(&mut self, id: &str) -> Result<(), StoreError> {
        self.doc.appts.retain(|a| a.id != id);
        self.persist()
    }

    // --- billing -------------------------------------------------------

    /// Invoices are append-only; there is no edit or delete operation.
    pub fn create_invoice(&mut self, input: &FormValues) -> Result<String, StoreError> {
        let record = BillingRecord {
            id: uid("b"),
            patient_id: input.get("patient").trim().to_string(),
            amount: number_or_zero(input.get("amount")),
            date: parse_datetime(input.get("date")),
            status: BillStatus::parse(input.get("status")).unwrap_or(BillStatus::Paid),
        };
        let id = record.id.clone();
        debug!("created invoice {id}");
        self.doc.billing.push(record);
        self.persist()?;
        Ok(id)
    }

    // --- inventory -----------------------------------------------------

    pub fn create_stock(&mut self, input: &FormValues) -> Result<String, StoreError> {
        let item = InventoryItem {
            id: uid("i"),
            item: non_empty(input.get("item"), "Item"),
            qty: number_or_zero(input.get("qty")),
            expiry: optional(input.get("expiry")),
        };
        let id = item.id.clone();
        debug!("created stock item {id}");
        self.doc.inventory.push(item);
        self.persist()?;
        Ok(id)
    }

    pub fn edit_stock(&mut self, id: &str, input: &FormValues) -> Result<bool, StoreError> {
        let Some(item) = self.doc.inventory.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        item.item = input.get("item").trim().to_string();
        item.qty = number_or_zero(input.get("qty"));
        item.expiry = optional(input.get("expiry"));
        self.persist()?;
        Ok(true)
    }

    pub fn delete_stock(&mut self, id: &str) -> Result<(), StoreError> {
        self.doc.inventory.retain(|i| i.id != id);
        self.persist()
    }

    // --- feedback ------------------------------------------------------

    /// Remove the feedback entry at the given position. Out-of-range
    /// indices are a silent no-op.
    pub fn delete_feedback(&mut self, index: usize) -> Result<bool, StoreError> {
        if index >= self.feedback.len() {
            return Ok(false);
        }
        self.feedback.remove(index);
        self.store.save_feedback(&self.feedback)?;
        Ok(true)
    }

    // --- settings ------------------------------------------------------

    /// Overwrite the clinic settings. An empty field keeps its prior
    /// value.
    pub fn save_settings(&mut self, name: &str, currency: &str) -> Result<(), StoreError> {
        if !name.trim().is_empty() {
            self.doc.settings.name = name.trim().to_string();
        }
        if !currency.trim().is_empty() {
            self.doc.settings.currency = currency.trim().to_string();
        }
        self.persist()
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use chrono::Duration;
    use tempfile::tempdir;

    fn service() -> (tempfile::TempDir, ClinicService) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let service = ClinicService::open(store).unwrap();
        (dir, service)
    }

    fn values(pairs: &[(&'static str, &str)]) -> FormValues {
        FormValues::from_pairs(pairs)
    }

    #[test]
    fn create_patient_assigns_id_and_updates_stats() {
        let (_dir, mut service) = service();
        let before = service.doc.patients.len();
        let id = service
            .create_patient(&values(&[
                ("name", "A"),
                ("phone", "123"),
                ("age", "30"),
                ("sex", "M"),
            ]))
            .unwrap();
        assert!(!id.is_empty());
        assert_eq!(service.doc.patients.len(), before + 1);
        let stats = query::stats(&service.doc, Local::now());
        assert_eq!(stats.patients, before + 1);
    }

    #[test]
    fn create_patient_defaults_empty_fields() {
        let (_dir, mut service) = service();
        service
            .create_patient(&values(&[
                ("name", ""),
                ("phone", ""),
                ("age", "abc"),
                ("sex", ""),
            ]))
            .unwrap();
        let patient = service.doc.patients.last().unwrap();
        assert_eq!(patient.name, "Unknown");
        assert_eq!(patient.phone, "");
        assert_eq!(patient.age, 0);
    }

    #[test]
    fn create_doctor_defaults_name_and_specialty() {
        let (_dir, mut service) = service();
        service
            .create_doctor(&values(&[("name", ""), ("specialty", ""), ("phone", "")]))
            .unwrap();
        let doctor = service.doc.doctors.last().unwrap();
        assert_eq!(doctor.name, "Dr. Unknown");
        assert_eq!(doctor.specialty, "General");
    }

    #[test]
    fn edit_of_unknown_id_is_a_silent_no_op() {
        let (_dir, mut service) = service();
        let snapshot = service.doc.clone();
        let edited = service
            .edit_patient("missing", &values(&[("name", "X")]))
            .unwrap();
        assert!(!edited);
        assert_eq!(service.doc, snapshot);
    }

    #[test]
    fn edit_mutates_in_place_and_keeps_the_id() {
        let (_dir, mut service) = service();
        let id = service
            .create_patient(&values(&[
                ("name", "A"),
                ("phone", "123"),
                ("age", "30"),
                ("sex", "M"),
            ]))
            .unwrap();
        let edited = service
            .edit_patient(
                &id,
                &values(&[("name", "B"), ("phone", "456"), ("age", "31"), ("sex", "M")]),
            )
            .unwrap();
        assert!(edited);
        assert_eq!(service.doc.patients.len(), 1);
        let patient = &service.doc.patients[0];
        assert_eq!(patient.id, id);
        assert_eq!(patient.name, "B");
        assert_eq!(patient.age, 31);
    }

    #[test]
    fn deleting_a_patient_cascades_to_appointments_and_billing() {
        let (_dir, mut service) = service();
        let pid = service
            .create_patient(&values(&[("name", "A"), ("phone", ""), ("age", "1"), ("sex", "")]))
            .unwrap();
        let did = service
            .create_doctor(&values(&[("name", "Dr. B"), ("specialty", ""), ("phone", "")]))
            .unwrap();
        service
            .create_appointment(&values(&[
                ("patient", &pid),
                ("doctor", &did),
                ("datetime", "2026-09-01 10:00"),
                ("status", "Scheduled"),
            ]))
            .unwrap();
        service
            .create_invoice(&values(&[
                ("patient", &pid),
                ("amount", "500"),
                ("date", "2026-09-01"),
                ("status", "Unpaid"),
            ]))
            .unwrap();

        service.delete_patient(&pid).unwrap();
        assert!(service.doc.patients.is_empty());
        assert!(!service.doc.appts.iter().any(|a| a.patient_id == pid));
        assert!(!service.doc.billing.iter().any(|b| b.patient_id == pid));
    }

    #[test]
    fn deleting_a_doctor_removes_their_appointments() {
        let (_dir, mut service) = service();
        let pid = service
            .create_patient(&values(&[("name", "A"), ("phone", ""), ("age", "1"), ("sex", "")]))
            .unwrap();
        let did = service
            .create_doctor(&values(&[("name", "Dr. B"), ("specialty", ""), ("phone", "")]))
            .unwrap();
        for _ in 0..2 {
            service
                .create_appointment(&values(&[
                    ("patient", &pid),
                    ("doctor", &did),
                    ("datetime", "2026-09-01 10:00"),
                    ("status", "Scheduled"),
                ]))
                .unwrap();
        }
        let before = service.doc.appts.len();

        service.delete_doctor(&did).unwrap();
        assert!(service.doc.doctors.is_empty());
        assert_eq!(service.doc.appts.len(), before - 2);
    }

    #[test]
    fn appointment_with_unparsable_datetime_falls_back_to_now() {
        let (_dir, mut service) = service();
        let before = Local::now() - Duration::seconds(1);
        service
            .create_appointment(&values(&[
                ("patient", "p1"),
                ("doctor", "d1"),
                ("datetime", "whenever"),
                ("status", "Scheduled"),
            ]))
            .unwrap();
        let appt = service.doc.appts.last().unwrap();
        assert!(appt.datetime > before);
    }

    #[test]
    fn invoice_amount_defaults_to_zero_when_unparsable() {
        let (_dir, mut service) = service();
        service
            .create_invoice(&values(&[
                ("patient", "p1"),
                ("amount", "lots"),
                ("date", "2026-01-01"),
                ("status", "Paid"),
            ]))
            .unwrap();
        assert_eq!(service.doc.billing.last().unwrap().amount, 0.0);
    }

    #[test]
    fn stock_qty_becomes_zero_on_non_numeric_edit() {
        let (_dir, mut service) = service();
        let id = service
            .create_stock(&values(&[("item", "Bandages"), ("qty", "40"), ("expiry", "")]))
            .unwrap();
        let edited = service
            .edit_stock(&id, &values(&[("item", "Bandages"), ("qty", "plenty"), ("expiry", "")]))
            .unwrap();
        assert!(edited);
        assert_eq!(service.doc.inventory[0].qty, 0);
    }

    #[test]
    fn empty_expiry_is_absent() {
        let (_dir, mut service) = service();
        service
            .create_stock(&values(&[("item", ""), ("qty", ""), ("expiry", "")]))
            .unwrap();
        let item = service.doc.inventory.last().unwrap();
        assert_eq!(item.item, "Item");
        assert_eq!(item.qty, 0);
        assert_eq!(item.expiry, None);
    }

    #[test]
    fn mutations_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let store = Store::open(dir.path()).unwrap();
            let mut service = ClinicService::open(store).unwrap();
            service
                .create_patient(&values(&[
                    ("name", "A"),
                    ("phone", "123"),
                    ("age", "30"),
                    ("sex", "M"),
                ]))
                .unwrap()
        };
        let store = Store::open(dir.path()).unwrap();
        let reloaded = ClinicService::open(store).unwrap();
        assert!(reloaded.doc.patients.iter().any(|p| p.id == id));
    }

    #[test]
    fn feedback_deletes_by_position() {
        let (_dir, mut service) = service();
        service.feedback = vec![
            FeedbackEntry {
                user: "a".to_string(),
                text: "first".to_string(),
                date: String::new(),
            },
            FeedbackEntry {
                user: "b".to_string(),
                text: "second".to_string(),
                date: String::new(),
            },
        ];
        assert!(service.delete_feedback(0).unwrap());
        assert_eq!(service.feedback.len(), 1);
        assert_eq!(service.feedback[0].text, "second");
        // out of range: no-op
        assert!(!service.delete_feedback(5).unwrap());
        assert_eq!(service.feedback.len(), 1);
    }

    #[test]
    fn settings_keep_prior_value_on_empty_field() {
        let (_dir, mut service) = service();
        service.save_settings("City Clinic", "USD").unwrap();
        assert_eq!(service.doc.settings.name, "City Clinic");
        assert_eq!(service.doc.settings.currency, "USD");

        service.save_settings("", "EUR").unwrap();
        assert_eq!(service.doc.settings.name, "City Clinic");
        assert_eq!(service.doc.settings.currency, "EUR");
    }

    #[test]
    fn seed_runs_once_and_persists() {
        let dir = tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            let mut service = ClinicService::open(store).unwrap();
            assert!(service.seed_demo_data().unwrap());
            assert!(!service.seed_demo_data().unwrap());
        }
        let store = Store::open(dir.path()).unwrap();
        let mut reloaded = ClinicService::open(store).unwrap();
        assert_eq!(reloaded.doc.patients.len(), 2);
        assert!(!reloaded.seed_demo_data().unwrap());
    }
}
