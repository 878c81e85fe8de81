#![allow(dead_code)]
/// Interactive terminal front end for the clinic management system.
///
/// Startup loads the persisted dataset, seeds the demo records on first
/// run, checks the login flag, then enters the page menu. Every page
/// renders its table from the current document and offers the CRUD
/// actions for that entity; each confirmed action mutates the document,
/// persists it, and the page re-renders on the next pass.
mod commands;
mod forms;
mod models;
mod query;
mod render;
mod seed;
mod store;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;

use commands::ClinicService;
use forms::{Console, Form};
use models::{Appointment, ApptStatus, BillStatus, ClinicDocument, Doctor, InventoryItem, Patient};
use query::SearchTarget;
use store::Store;

/// Terminal front end for clinic patients, doctors, appointments,
/// billing and stock.
#[derive(Parser)]
#[command(name = "healclinic", version, about)]
struct Args {
    /// Directory holding the clinic's data files
    #[arg(long, default_value = "clinic-data")]
    data_dir: PathBuf,
}

struct ClinicCli<R, W> {
    service: ClinicService,
    console: Console<R, W>,
    running: bool,
}

impl<R: BufRead, W: Write> ClinicCli<R, W> {
    fn new(service: ClinicService, console: Console<R, W>) -> Self {
        ClinicCli {
            service,
            console,
            running: true,
        }
    }

    fn print_header(&mut self) -> io::Result<()> {
        let name = self.service.doc.settings.name.to_uppercase();
        let out = self.console.writer();
        writeln!(out, "\n{}", "=".repeat(60))?;
        writeln!(out, "       {}", name)?;
        writeln!(out, "{}", "=".repeat(60))
    }

    fn print_menu(&mut self) -> io::Result<()> {
        let out = self.console.writer();
        writeln!(out, "\n--- Main Menu ---")?;
        writeln!(out, "1. Dashboard")?;
        writeln!(out, "2. Patients")?;
        writeln!(out, "3. Doctors")?;
        writeln!(out, "4. Appointments")?;
        writeln!(out, "5. Billing")?;
        writeln!(out, "6. Inventory")?;
        writeln!(out, "7. Patient profiles")?;
        writeln!(out, "8. Feedback")?;
        writeln!(out, "9. Settings")?;
        writeln!(out, "10. Search")?;
        writeln!(out, "11. Logout")?;
        writeln!(out, "12. Exit")?;
        writeln!(out, "{}", "-".repeat(20))
    }

    /// The login gate: reuse the stored session or ask for a name and
    /// store it. Presence of the flag is the whole check.
    fn ensure_session(&mut self) -> anyhow::Result<String> {
        if let Some(user) = self.service.session() {
            return Ok(user);
        }
        let name = self.console.prompt("Login name", "Guest")?;
        self.service.login(&name)?;
        Ok(name)
    }

    fn run(&mut self) -> anyhow::Result<()> {
        self.print_header()?;
        if self.service.seed_demo_data()? {
            writeln!(self.console.writer(), "Loaded example data for first run")?;
        }
        let user = self.ensure_session()?;
        writeln!(self.console.writer(), "Logged in as {}", user)?;

        while self.running {
            self.print_menu()?;
            let choice = self.console.prompt("Enter choice", "12")?;
            match choice.trim() {
                "1" => self.dashboard_page()?,
                "2" => self.patients_page()?,
                "3" => self.doctors_page()?,
                "4" => self.appointments_page()?,
                "5" => self.billing_page()?,
                "6" => self.inventory_page()?,
                "7" => self.profiles_page()?,
                "8" => self.feedback_page()?,
                "9" => self.settings_page()?,
                "10" => self.search_action()?,
                "11" => self.logout_action()?,
                "12" => {
                    self.running = false;
                    writeln!(self.console.writer(), "\nGoodbye!")?;
                }
                _ => writeln!(self.console.writer(), "Invalid choice")?,
            }
        }
        Ok(())
    }

    // --- dashboard -----------------------------------------------------

    fn dashboard_page(&mut self) -> anyhow::Result<()> {
        loop {
            let clinic = self.service.doc.settings.name.clone();
            render::render_dashboard_header(&clinic, Local::now(), self.console.writer())?;
            let stats = query::stats(&self.service.doc, Local::now());
            render::render_stats(&stats, self.console.writer())?;
            let recent = query::recent_appointments(&self.service.doc);
            render::render_recent_appointments(&recent, self.console.writer())?;

            writeln!(self.console.writer(), "\n[q]uick add  [b]ack")?;
            match self.console.prompt("Action", "b")?.as_str() {
                "q" => self.quick_add()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn quick_add(&mut self) -> anyhow::Result<()> {
        let form = Form::new("Quick Add").choice(
            "type",
            "Type",
            vec![
                ("patient".to_string(), "Patient".to_string()),
                ("doctor".to_string(), "Doctor".to_string()),
                ("appt".to_string(), "Appointment".to_string()),
            ],
            "patient",
        );
        let Some(values) = self.console.run_form(&form)? else {
            return Ok(());
        };
        match values.get("type") {
            "doctor" => self.add_doctor(),
            "appt" => self.add_appointment(),
            _ => self.add_patient(),
        }
    }

    // --- patients ------------------------------------------------------

    fn patients_page(&mut self) -> anyhow::Result<()> {
        let mut filter = String::new();
        loop {
            {
                let rows = query::filtered_patients(&self.service.doc, &filter);
                render::render_patients(&rows, self.console.writer())?;
            }
            writeln!(self.console.writer(), "\n[a]dd  [e]dit  [d]elete  [f]ilter  [b]ack")?;
            match self.console.prompt("Action", "b")?.as_str() {
                "a" => self.add_patient()?,
                "e" => self.edit_patient_action()?,
                "d" => self.delete_patient_action()?,
                "f" => filter = self.console.prompt("Filter (name or phone)", "")?,
                _ => break,
            }
        }
        Ok(())
    }

    fn add_patient(&mut self) -> anyhow::Result<()> {
        let form = patient_form("New Patient", None);
        if let Some(values) = self.console.run_form(&form)? {
            self.service.create_patient(&values)?;
        }
        Ok(())
    }

    fn edit_patient_action(&mut self) -> anyhow::Result<()> {
        let id = self.console.prompt("Patient id", "")?;
        let form = match query::find_patient(&self.service.doc, &id) {
            Some(patient) => patient_form("Edit Patient", Some(patient)),
            None => return Ok(()),
        };
        if let Some(values) = self.console.run_form(&form)? {
            self.service.edit_patient(&id, &values)?;
        }
        Ok(())
    }

    fn delete_patient_action(&mut self) -> anyhow::Result<()> {
        let id = self.console.prompt("Patient id", "")?;
        if self.console.confirm("Delete patient?")? {
            self.service.delete_patient(&id)?;
        }
        Ok(())
    }

    // --- doctors -------------------------------------------------------

    fn doctors_page(&mut self) -> anyhow::Result<()> {
        let mut filter = String::new();
        loop {
            {
                let rows = query::filtered_doctors(&self.service.doc, &filter);
                render::render_doctors(&rows, self.console.writer())?;
            }
            writeln!(self.console.writer(), "\n[a]dd  [e]dit  [d]elete  [f]ilter  [b]ack")?;
            match self.console.prompt("Action", "b")?.as_str() {
                "a" => self.add_doctor()?,
                "e" => self.edit_doctor_action()?,
                "d" => self.delete_doctor_action()?,
                "f" => filter = self.console.prompt("Filter (name, specialty or phone)", "")?,
                _ => break,
            }
        }
        Ok(())
    }

    fn add_doctor(&mut self) -> anyhow::Result<()> {
        let form = doctor_form("New Doctor", None);
        if let Some(values) = self.console.run_form(&form)? {
            self.service.create_doctor(&values)?;
        }
        Ok(())
    }

    fn edit_doctor_action(&mut self) -> anyhow::Result<()> {
        let id = self.console.prompt("Doctor id", "")?;
        let form = match query::find_doctor(&self.service.doc, &id) {
            Some(doctor) => doctor_form("Edit Doctor", Some(doctor)),
            None => return Ok(()),
        };
        if let Some(values) = self.console.run_form(&form)? {
            self.service.edit_doctor(&id, &values)?;
        }
        Ok(())
    }

    fn delete_doctor_action(&mut self) -> anyhow::Result<()> {
        let id = self.console.prompt("Doctor id", "")?;
        if self.console.confirm("Delete doctor?")? {
            self.service.delete_doctor(&id)?;
        }
        Ok(())
    }

    // --- appointments --------------------------------------------------

    fn appointments_page(&mut self) -> anyhow::Result<()> {
        let mut doctor_filter: Option<String> = None;
        let mut date_filter: Option<NaiveDate> = None;
        loop {
            {
                let rows = query::filtered_appointments(
                    &self.service.doc,
                    doctor_filter.as_deref(),
                    date_filter,
                );
                render::render_appointments(&rows, self.console.writer())?;
            }
            writeln!(
                self.console.writer(),
                "\n[a]dd  [e]dit  [d]elete  [f]ilter doctor  [t]filter date  [b]ack"
            )?;
            match self.console.prompt("Action", "b")?.as_str() {
                "a" => self.add_appointment()?,
                "e" => self.edit_appointment_action()?,
                "d" => self.delete_appointment_action()?,
                "f" => {
                    let mut options = vec![(String::new(), "All Doctors".to_string())];
                    options.extend(query::doctor_options(&self.service.doc));
                    let form =
                        Form::new("Filter by Doctor").choice("doctor", "Doctor", options, "");
                    if let Some(values) = self.console.run_form(&form)? {
                        let id = values.get("doctor").to_string();
                        doctor_filter = if id.is_empty() { None } else { Some(id) };
                    }
                }
                "t" => {
                    let raw = self
                        .console
                        .prompt("Date (YYYY-MM-DD, empty for all)", "")?;
                    date_filter = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok();
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn add_appointment(&mut self) -> anyhow::Result<()> {
        let form = appointment_form(&self.service.doc, "New Appointment", None);
        if let Some(values) = self.console.run_form(&form)? {
            self.service.create_appointment(&values)?;
        }
        Ok(())
    }

    fn edit_appointment_action(&mut self) -> anyhow::Result<()> {
        let id = self.console.prompt("Appointment id", "")?;
        let form = {
            let Some(appt) = self.service.doc.appts.iter().find(|a| a.id == id) else {
                return Ok(());
            };
            appointment_form(&self.service.doc, "Edit Appointment", Some(appt))
        };
        if let Some(values) = self.console.run_form(&form)? {
            self.service.edit_appointment(&id, &values)?;
        }
        Ok(())
    }

    fn delete_appointment_action(&mut self) -> anyhow::Result<()> {
        let id = self.console.prompt("Appointment id", "")?;
        if self.console.confirm("Delete appointment?")? {
            self.service.delete_appointment(&id)?;
        }
        Ok(())
    }

    // --- billing -------------------------------------------------------

    fn billing_page(&mut self) -> anyhow::Result<()> {
        loop {
            {
                let rows = query::billing_rows(&self.service.doc);
                render::render_billing(&rows, self.console.writer())?;
            }
            writeln!(self.console.writer(), "\n[a]dd invoice  [b]ack")?;
            match self.console.prompt("Action", "b")?.as_str() {
                "a" => {
                    let form = invoice_form(&self.service.doc);
                    if let Some(values) = self.console.run_form(&form)? {
                        self.service.create_invoice(&values)?;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    // --- inventory -----------------------------------------------------

    fn inventory_page(&mut self) -> anyhow::Result<()> {
        loop {
            {
                let items = &self.service.doc.inventory;
                render::render_inventory(items, self.console.writer())?;
            }
            writeln!(self.console.writer(), "\n[a]dd  [e]dit  [d]elete  [b]ack")?;
            match self.console.prompt("Action", "b")?.as_str() {
                "a" => {
                    let form = stock_form("Add Stock", None);
                    if let Some(values) = self.console.run_form(&form)? {
                        self.service.create_stock(&values)?;
                    }
                }
                "e" => self.edit_stock_action()?,
                "d" => {
                    let id = self.console.prompt("Item id", "")?;
                    if self.console.confirm("Delete stock item?")? {
                        self.service.delete_stock(&id)?;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn edit_stock_action(&mut self) -> anyhow::Result<()> {
        let id = self.console.prompt("Item id", "")?;
        let form = {
            let Some(item) = self.service.doc.inventory.iter().find(|i| i.id == id) else {
                return Ok(());
            };
            stock_form("Edit Stock", Some(item))
        };
        if let Some(values) = self.console.run_form(&form)? {
            self.service.edit_stock(&id, &values)?;
        }
        Ok(())
    }

    // --- profiles and feedback -----------------------------------------

    fn profiles_page(&mut self) -> anyhow::Result<()> {
        let mut filter = String::new();
        loop {
            {
                let rows = query::filtered_profiles(&self.service.profiles, &filter);
                render::render_profiles(&rows, self.console.writer())?;
            }
            writeln!(self.console.writer(), "\n[f]ilter  [b]ack")?;
            match self.console.prompt("Action", "b")?.as_str() {
                "f" => filter = self.console.prompt("Filter (name, mobile or district)", "")?,
                _ => break,
            }
        }
        Ok(())
    }

    fn feedback_page(&mut self) -> anyhow::Result<()> {
        loop {
            render::render_feedback(&self.service.feedback, self.console.writer())?;
            writeln!(self.console.writer(), "\n[d]elete  [b]ack")?;
            match self.console.prompt("Action", "b")?.as_str() {
                "d" => {
                    let raw = self.console.prompt("Entry number", "")?;
                    if !self.console.confirm("Remove feedback?")? {
                        continue;
                    }
                    if let Some(index) = raw.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                        self.service.delete_feedback(index)?;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    // --- settings, search, logout --------------------------------------

    fn settings_page(&mut self) -> anyhow::Result<()> {
        let form = Form::new("Settings")
            .text("name", "Clinic name", &self.service.doc.settings.name)
            .text("currency", "Currency", &self.service.doc.settings.currency);
        if let Some(values) = self.console.run_form(&form)? {
            self.service
                .save_settings(values.get("name"), values.get("currency"))?;
            writeln!(self.console.writer(), "Settings saved")?;
        }
        Ok(())
    }

    fn search_action(&mut self) -> anyhow::Result<()> {
        let q = self.console.prompt("Search", "")?;
        match query::global_search(&self.service.doc, &q) {
            Some(SearchTarget::Patients) => self.patients_page(),
            Some(SearchTarget::Doctors) => self.doctors_page(),
            None => {
                writeln!(self.console.writer(), "No matches")?;
                Ok(())
            }
        }
    }

    fn logout_action(&mut self) -> anyhow::Result<()> {
        if self.console.confirm("Are you sure you want to logout?")? {
            self.service.logout()?;
            self.running = false;
            writeln!(self.console.writer(), "Logged out")?;
        }
        Ok(())
    }
}

// --- form builders -----------------------------------------------------

fn sex_options() -> Vec<(String, String)> {
    ["F", "M", "Other"]
        .iter()
        .map(|s| (s.to_string(), s.to_string()))
        .collect()
}

fn appt_status_options() -> Vec<(String, String)> {
    [ApptStatus::Scheduled, ApptStatus::Completed, ApptStatus::Cancelled]
        .iter()
        .map(|s| (s.name().to_string(), s.name().to_string()))
        .collect()
}

fn bill_status_options() -> Vec<(String, String)> {
    [BillStatus::Paid, BillStatus::Unpaid]
        .iter()
        .map(|s| (s.name().to_string(), s.name().to_string()))
        .collect()
}

fn patient_options(doc: &ClinicDocument) -> Vec<(String, String)> {
    doc.patients
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect()
}

fn patient_form(title: &str, existing: Option<&Patient>) -> Form {
    let (name, phone, age, sex) = match existing {
        Some(p) => (p.name.clone(), p.phone.clone(), p.age.to_string(), p.sex.clone()),
        None => (String::new(), String::new(), "0".to_string(), "F".to_string()),
    };
    Form::new(title)
        .text("name", "Name", &name)
        .text("phone", "Phone", &phone)
        .text("age", "Age", &age)
        .choice("sex", "Sex", sex_options(), &sex)
}

fn doctor_form(title: &str, existing: Option<&Doctor>) -> Form {
    let (name, specialty, phone) = match existing {
        Some(d) => (d.name.clone(), d.specialty.clone(), d.phone.clone()),
        None => (String::new(), String::new(), String::new()),
    };
    Form::new(title)
        .text("name", "Name", &name)
        .text("specialty", "Specialty", &specialty)
        .text("phone", "Phone", &phone)
}

fn appointment_form(doc: &ClinicDocument, title: &str, existing: Option<&Appointment>) -> Form {
    let datetime = existing.map_or_else(
        || Local::now().format("%Y-%m-%d %H:%M").to_string(),
        |a| a.datetime.format("%Y-%m-%d %H:%M").to_string(),
    );
    let patient = existing.map(|a| a.patient_id.clone()).unwrap_or_default();
    let doctor = existing.map(|a| a.doctor_id.clone()).unwrap_or_default();
    let status = existing.map_or(ApptStatus::Scheduled, |a| a.status);
    Form::new(title)
        .choice("patient", "Patient", patient_options(doc), &patient)
        .choice("doctor", "Doctor", query::doctor_options(doc), &doctor)
        .text("datetime", "Date & time (YYYY-MM-DD HH:MM)", &datetime)
        .choice("status", "Status", appt_status_options(), status.name())
}

fn invoice_form(doc: &ClinicDocument) -> Form {
    Form::new("New Invoice")
        .choice("patient", "Patient", patient_options(doc), "")
        .text("amount", "Amount", "")
        .text("date", "Date (YYYY-MM-DD)", &Local::now().format("%Y-%m-%d").to_string())
        .choice("status", "Status", bill_status_options(), BillStatus::Paid.name())
}

fn stock_form(title: &str, existing: Option<&InventoryItem>) -> Form {
    let (item, qty, expiry) = match existing {
        Some(i) => (
            i.item.clone(),
            i.qty.to_string(),
            i.expiry.clone().unwrap_or_default(),
        ),
        None => (String::new(), "0".to_string(), String::new()),
    };
    Form::new(title)
        .text("item", "Item", &item)
        .text("qty", "Quantity", &qty)
        .text("expiry", "Expiry (YYYY-MM-DD, optional)", &expiry)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = Store::open(&args.data_dir)
        .with_context(|| format!("opening data directory {}", args.data_dir.display()))?;
    let service = ClinicService::open(store).context("loading clinic data")?;

    let console = Console::new(io::stdin().lock(), io::stdout().lock());
    let mut cli = ClinicCli::new(service, console);
    cli.run()
}
