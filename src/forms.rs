/// Prompt-driven form dialogs.
///
/// A `Form` is a typed schema of fields; `Console` walks the schema over
/// an input/output pair, then asks for confirmation. Declining closes the
/// dialog with no side effects; confirming hands the collected raw values
/// back to the caller, which owns all defaulting and sanitizing.
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

enum FieldKind {
    /// Free text.
    Text,
    /// A fixed set of (value, label) options picked by number.
    Choice(Vec<(String, String)>),
}

pub struct Field {
    id: &'static str,
    label: String,
    default: String,
    kind: FieldKind,
}

/// An ordered field schema with a title.
pub struct Form {
    title: String,
    fields: Vec<Field>,
}

impl Form {
    pub fn new(title: impl Into<String>) -> Self {
        Form {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Add a free-text field. An empty `default` means the field starts
    /// blank.
    pub fn text(mut self, id: &'static str, label: &str, default: &str) -> Self {
        self.fields.push(Field {
            id,
            label: label.to_string(),
            default: default.to_string(),
            kind: FieldKind::Text,
        });
        self
    }

    /// Add a selection field over (value, label) pairs. `default` is the
    /// value to fall back to on empty or unrecognised input.
    pub fn choice(
        mut self,
        id: &'static str,
        label: &str,
        options: Vec<(String, String)>,
        default: &str,
    ) -> Self {
        self.fields.push(Field {
            id,
            label: label.to_string(),
            default: default.to_string(),
            kind: FieldKind::Choice(options),
        });
        self
    }
}

/// Raw field values collected from a confirmed form.
pub struct FormValues(HashMap<&'static str, String>);

impl FormValues {
    /// The raw value for a field id; empty string when the field was never
    /// collected.
    pub fn get(&self, id: &str) -> &str {
        self.0.get(id).map_or("", String::as_str)
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&'static str, &str)]) -> Self {
        FormValues(
            pairs
                .iter()
                .map(|(id, value)| (*id, value.to_string()))
                .collect(),
        )
    }
}

/// The interactive console: a line-based input and an output surface.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// The output surface, for render functions to write tables into.
    pub fn writer(&mut self) -> &mut W {
        &mut self.output
    }

    /// Give up the console and hand back its output surface.
    pub fn into_writer(self) -> W {
        self.output
    }

    /// Prompt for one line. Empty input (or end of input) takes the
    /// default.
    pub fn prompt(&mut self, label: &str, default: &str) -> io::Result<String> {
        if default.is_empty() {
            write!(self.output, "{}: ", label)?;
        } else {
            write!(self.output, "{} [{}]: ", label, default)?;
        }
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        let line = line.trim();
        if read == 0 || line.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(line.to_string())
        }
    }

    /// A y/n gate. Anything but y counts as no.
    pub fn confirm(&mut self, message: &str) -> io::Result<bool> {
        let answer = self.prompt(&format!("{} (y/n)", message), "n")?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }

    /// Run a form dialog: show the title, collect every field in order,
    /// then ask to save. Returns None when the user declines, so nothing
    /// gets applied.
    pub fn run_form(&mut self, form: &Form) -> io::Result<Option<FormValues>> {
        writeln!(self.output, "\n--- {} ---", form.title)?;
        let mut values = HashMap::new();
        for field in &form.fields {
            let value = match &field.kind {
                FieldKind::Text => self.prompt(&field.label, &field.default)?,
                FieldKind::Choice(options) => self.prompt_choice(field, options)?,
            };
            values.insert(field.id, value);
        }
        if self.confirm("Save")? {
            Ok(Some(FormValues(values)))
        } else {
            Ok(None)
        }
    }

    fn prompt_choice(
        &mut self,
        field: &Field,
        options: &[(String, String)],
    ) -> io::Result<String> {
        if options.is_empty() {
            return Ok(field.default.clone());
        }
        writeln!(self.output, "{}:", field.label)?;
        for (i, (_, label)) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, label)?;
        }
        let default_index = options
            .iter()
            .position(|(value, _)| *value == field.default)
            .map_or_else(String::new, |i| (i + 1).to_string());
        let raw = self.prompt("Select", &default_index)?;
        let picked = raw
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| options.get(n));
        match picked {
            Some((value, _)) => Ok(value.clone()),
            // unrecognised input falls back: the stated default if any,
            // else the first option
            None if !field.default.is_empty() => Ok(field.default.clone()),
            None => Ok(options[0].0.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(script: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn patient_form() -> Form {
        Form::new("New Patient")
            .text("name", "Name", "")
            .text("phone", "Phone", "")
            .text("age", "Age", "0")
            .choice(
                "sex",
                "Sex",
                vec![
                    ("F".to_string(), "F".to_string()),
                    ("M".to_string(), "M".to_string()),
                    ("Other".to_string(), "Other".to_string()),
                ],
                "F",
            )
    }

    #[test]
    fn confirmed_form_collects_values() {
        let mut console = console("Ravi\n9876543210\n36\n2\ny\n");
        let values = console.run_form(&patient_form()).unwrap().expect("confirmed");
        assert_eq!(values.get("name"), "Ravi");
        assert_eq!(values.get("phone"), "9876543210");
        assert_eq!(values.get("age"), "36");
        assert_eq!(values.get("sex"), "M");
    }

    #[test]
    fn empty_input_takes_field_defaults() {
        let mut console = console("\n\n\n\ny\n");
        let values = console.run_form(&patient_form()).unwrap().expect("confirmed");
        assert_eq!(values.get("name"), "");
        assert_eq!(values.get("age"), "0");
        assert_eq!(values.get("sex"), "F");
    }

    #[test]
    fn declined_form_returns_none() {
        let mut console = console("Ravi\n\n\n\nn\n");
        assert!(console.run_form(&patient_form()).unwrap().is_none());
    }

    #[test]
    fn end_of_input_counts_as_decline() {
        let mut console = console("Ravi\n");
        assert!(console.run_form(&patient_form()).unwrap().is_none());
    }

    #[test]
    fn choice_out_of_range_falls_back_to_default() {
        let mut console = console("\n\n\n9\ny\n");
        let values = console.run_form(&patient_form()).unwrap().expect("confirmed");
        assert_eq!(values.get("sex"), "F");
    }

    #[test]
    fn choice_with_no_options_yields_default() {
        let form = Form::new("Pick").choice("who", "Who", Vec::new(), "");
        let mut console = console("y\n");
        let values = console.run_form(&form).unwrap().expect("confirmed");
        assert_eq!(values.get("who"), "");
    }

    #[test]
    fn missing_field_reads_as_empty() {
        let values = FormValues::from_pairs(&[("name", "A")]);
        assert_eq!(values.get("name"), "A");
        assert_eq!(values.get("phone"), "");
    }

    #[test]
    fn confirm_accepts_only_yes() {
        let mut console = console("y\nn\nmaybe\n");
        assert!(console.confirm("Delete patient?").unwrap());
        assert!(!console.confirm("Delete patient?").unwrap());
        assert!(!console.confirm("Delete patient?").unwrap());
    }
}
