/// Demo dataset loaded on first use.
use chrono::{Duration, Local};

use crate::models::{
    uid, Appointment, ApptStatus, BillStatus, BillingRecord, ClinicDocument, Doctor,
    InventoryItem, Patient,
};

/// Populate the document with a small example dataset when no patients
/// exist yet. Returns true when it seeded, so the caller persists the
/// result. The gate is only the patient collection being empty: deleting
/// every patient brings the demo data back on the next start.
pub fn seed_if_empty(doc: &mut ClinicDocument) -> bool {
    if !doc.patients.is_empty() {
        return false;
    }

    let patients = vec![
        Patient {
            id: uid("p"),
            name: "Ravi Kumar".to_string(),
            phone: "9876543210".to_string(),
            age: 36,
            sex: "M".to_string(),
        },
        Patient {
            id: uid("p"),
            name: "Meena Iyer".to_string(),
            phone: "9123456780".to_string(),
            age: 29,
            sex: "F".to_string(),
        },
    ];
    let doctors = vec![
        Doctor {
            id: uid("d"),
            name: "Dr. Ajay Nair".to_string(),
            specialty: "Cardiology".to_string(),
            phone: "9001112223".to_string(),
        },
        Doctor {
            id: uid("d"),
            name: "Dr. Sima Rao".to_string(),
            specialty: "General Physician".to_string(),
            phone: "9001113334".to_string(),
        },
    ];

    doc.appts = vec![
        Appointment {
            id: uid("a"),
            patient_id: patients[0].id.clone(),
            doctor_id: doctors[0].id.clone(),
            datetime: Local::now() + Duration::days(1),
            status: ApptStatus::Scheduled,
        },
        Appointment {
            id: uid("a"),
            patient_id: patients[1].id.clone(),
            doctor_id: doctors[1].id.clone(),
            datetime: Local::now(),
            status: ApptStatus::Completed,
        },
    ];
    doc.billing = vec![BillingRecord {
        id: uid("b"),
        patient_id: patients[0].id.clone(),
        amount: 3200.0,
        date: Local::now(),
        status: BillStatus::Paid,
    }];
    doc.inventory = vec![InventoryItem {
        id: uid("i"),
        item: "Paracetamol 500mg".to_string(),
        qty: 120,
        expiry: Some("2026-02-01".to_string()),
    }];
    doc.patients = patients;
    doc.doctors = doctors;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_an_empty_document() {
        let mut doc = ClinicDocument::default();
        assert!(seed_if_empty(&mut doc));
        assert_eq!(doc.patients.len(), 2);
        assert_eq!(doc.doctors.len(), 2);
        assert_eq!(doc.appts.len(), 2);
        assert_eq!(doc.billing.len(), 1);
        assert_eq!(doc.inventory.len(), 1);
        // one future-dated Scheduled, one Completed right now
        let now = Local::now();
        assert!(doc
            .appts
            .iter()
            .any(|a| a.status == ApptStatus::Scheduled && a.datetime > now));
        assert!(doc.appts.iter().any(|a| a.status == ApptStatus::Completed));
    }

    #[test]
    fn seeded_appointments_reference_seeded_records() {
        let mut doc = ClinicDocument::default();
        seed_if_empty(&mut doc);
        for appt in &doc.appts {
            assert!(doc.patients.iter().any(|p| p.id == appt.patient_id));
            assert!(doc.doctors.iter().any(|d| d.id == appt.doctor_id));
        }
    }

    #[test]
    fn second_call_is_a_no_op() {
        let mut doc = ClinicDocument::default();
        assert!(seed_if_empty(&mut doc));
        let snapshot = doc.clone();
        assert!(!seed_if_empty(&mut doc));
        assert_eq!(doc, snapshot);
    }

    #[test]
    fn reseeds_once_all_patients_are_gone() {
        let mut doc = ClinicDocument::default();
        seed_if_empty(&mut doc);
        doc.patients.clear();
        assert!(seed_if_empty(&mut doc));
        assert_eq!(doc.patients.len(), 2);
    }
}
