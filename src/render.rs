/// Table rendering.
///
/// Every function takes a projection and a target surface and rewrites
/// that surface's rows from scratch; nothing is appended to prior output,
/// so rendering the same data twice produces identical bytes.
use std::io::{self, Write};

use chrono::{DateTime, Local};

use crate::models::{Doctor, FeedbackEntry, InventoryItem, Patient, PatientProfile};
use crate::query::{ApptRow, BillingRow, Stats, MISSING};

fn or_missing(value: &str) -> &str {
    if value.is_empty() {
        MISSING
    } else {
        value
    }
}

pub fn render_stats<W: Write>(stats: &Stats, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "Patients: {}   Doctors: {}   Upcoming appointments: {}",
        stats.patients, stats.doctors, stats.upcoming_appts
    )
}

pub fn render_recent_appointments<W: Write>(rows: &[ApptRow], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Recent Appointments ---")?;
    if rows.is_empty() {
        return writeln!(out, "No appointments yet");
    }
    writeln!(out, "{:<20} {:<20} {:<17} {}", "Patient", "Doctor", "Date", "Status")?;
    for row in rows {
        writeln!(
            out,
            "{:<20} {:<20} {:<17} {}",
            row.patient,
            row.doctor,
            row.datetime.format("%Y-%m-%d %H:%M"),
            row.status.name()
        )?;
    }
    Ok(())
}

pub fn render_patients<W: Write>(patients: &[&Patient], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Patients ({}) ---", patients.len())?;
    if patients.is_empty() {
        return writeln!(out, "No patients yet");
    }
    writeln!(
        out,
        "{:<4} {:<9} {:<20} {:<12} {}",
        "#", "ID", "Name", "Phone", "Age/Sex"
    )?;
    for (i, p) in patients.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<9} {:<20} {:<12} {} / {}",
            i + 1,
            p.id,
            p.name,
            p.phone,
            p.age,
            or_missing(&p.sex)
        )?;
    }
    Ok(())
}

pub fn render_doctors<W: Write>(doctors: &[&Doctor], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Doctors ({}) ---", doctors.len())?;
    if doctors.is_empty() {
        return writeln!(out, "No doctors yet");
    }
    writeln!(
        out,
        "{:<4} {:<9} {:<22} {:<20} {}",
        "#", "ID", "Name", "Specialty", "Phone"
    )?;
    for (i, d) in doctors.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<9} {:<22} {:<20} {}",
            i + 1,
            d.id,
            d.name,
            d.specialty,
            d.phone
        )?;
    }
    Ok(())
}

pub fn render_appointments<W: Write>(rows: &[ApptRow], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Appointments ({}) ---", rows.len())?;
    if rows.is_empty() {
        return writeln!(out, "No appointments yet");
    }
    writeln!(
        out,
        "{:<4} {:<9} {:<20} {:<20} {:<17} {}",
        "#", "ID", "Patient", "Doctor", "Date", "Status"
    )?;
    for (i, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<9} {:<20} {:<20} {:<17} {}",
            i + 1,
            row.id,
            row.patient,
            row.doctor,
            row.datetime.format("%Y-%m-%d %H:%M"),
            row.status.name()
        )?;
    }
    Ok(())
}

pub fn render_billing<W: Write>(rows: &[BillingRow], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Billing ({}) ---", rows.len())?;
    if rows.is_empty() {
        return writeln!(out, "No invoices yet");
    }
    writeln!(
        out,
        "{:<4} {:<20} {:<14} {:<12} {}",
        "#", "Patient", "Amount", "Date", "Status"
    )?;
    for (i, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<20} {:<14} {:<12} {}",
            i + 1,
            row.patient,
            format!("{} {}", row.currency, row.amount),
            row.date.format("%Y-%m-%d"),
            row.status.name()
        )?;
    }
    Ok(())
}

pub fn render_inventory<W: Write>(items: &[InventoryItem], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Inventory ({}) ---", items.len())?;
    if items.is_empty() {
        return writeln!(out, "No stock yet");
    }
    writeln!(out, "{:<4} {:<9} {:<24} {:<8} {}", "#", "ID", "Item", "Qty", "Expiry")?;
    for (i, item) in items.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<9} {:<24} {:<8} {}",
            i + 1,
            item.id,
            item.item,
            item.qty,
            item.expiry.as_deref().unwrap_or(MISSING)
        )?;
    }
    Ok(())
}

pub fn render_profiles<W: Write>(profiles: &[&PatientProfile], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Patient Profiles ({}) ---", profiles.len())?;
    if profiles.is_empty() {
        return writeln!(out, "No profiles yet");
    }
    writeln!(
        out,
        "{:<4} {:<20} {:<12} {:<11} {:<7} {:<18} {:<24} {}",
        "#", "Name", "Mobile", "DOB", "Gender", "District/City", "Email", "Blood"
    )?;
    for (i, p) in profiles.iter().enumerate() {
        let place = if p.city.is_empty() {
            p.district.clone()
        } else {
            format!("{}/{}", p.district, p.city)
        };
        writeln!(
            out,
            "{:<4} {:<20} {:<12} {:<11} {:<7} {:<18} {:<24} {}",
            i + 1,
            or_missing(&p.name),
            or_missing(&p.mobile),
            or_missing(&p.dob),
            or_missing(&p.gender),
            or_missing(&place),
            or_missing(&p.email),
            or_missing(&p.blood)
        )?;
    }
    Ok(())
}

pub fn render_feedback<W: Write>(entries: &[FeedbackEntry], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Feedback ({}) ---", entries.len())?;
    if entries.is_empty() {
        return writeln!(out, "No feedback yet");
    }
    writeln!(out, "{:<4} {:<16} {:<44} {}", "#", "User", "Feedback", "Date")?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<16} {:<44} {}",
            i + 1,
            or_missing(&entry.user),
            entry.text,
            entry.date
        )?;
    }
    Ok(())
}

pub fn render_dashboard_header<W: Write>(
    clinic: &str,
    today: DateTime<Local>,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "\n{} — {}", clinic, today.format("%A, %Y-%m-%d"))
}
