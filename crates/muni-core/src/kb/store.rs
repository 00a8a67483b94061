//! Procedure records and the sectioned `.txt` loader.
//!
//! Each procedure file is plain text divided by Spanish section headings
//! (`Titulo:`, `Requisitos:`, ...). The parser walks line by line: a
//! heading switches the current section, anything else feeds it. List
//! sections start a new entry on a `1.-` or `-` marker and fold wrapped
//! lines into the previous entry.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context as _, Result};
use regex::Regex;

/// Contact details for follow-up questions about a procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub phone: String,
    pub extension: String,
    pub email: String,
}

/// One administrative procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Procedure {
    pub title: String,
    pub code: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub channels: Vec<String>,
    pub fee: String,
    pub payment_methods: Vec<String>,
    pub processing_time: String,
    pub offices: Vec<String>,
    pub submission_unit: String,
    pub approval_unit: String,
    pub contact: Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Description,
    Requirements,
    Channels,
    Fee,
    PaymentMethods,
    Offices,
    SubmissionUnit,
    ApprovalUnit,
    Contact,
}

const SECTION_HEADINGS: &[(&str, Option<Section>)] = &[
    ("Titulo:", None),
    ("Código:", None),
    ("Descripción del procedimiento:", Some(Section::Description)),
    ("Descripción del Servicio:", Some(Section::Description)),
    ("Requisitos:", Some(Section::Requirements)),
    ("Canales de atención:", Some(Section::Channels)),
    (
        "Pago por derecho de tramitación:",
        Some(Section::Fee),
    ),
    ("Modalidad de pago:", Some(Section::PaymentMethods)),
    ("Plazo:", None),
    ("Sedes y horarios de atención:", Some(Section::Offices)),
    (
        "Unidad de organización donde se presenta la documentación:",
        Some(Section::SubmissionUnit),
    ),
    (
        "Unidad de organización responsable de aprobar la solicitud:",
        Some(Section::ApprovalUnit),
    ),
    ("Consulta sobre el servicio:", Some(Section::Contact)),
];

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.-|-+)\s*.+").unwrap());

fn heading_of(line: &str) -> Option<(&'static str, Option<Section>)> {
    SECTION_HEADINGS
        .iter()
        .find(|(kw, _)| line.starts_with(kw))
        .copied()
}

/// Parses one procedure file. `fallback_key` (the file stem) stands in
/// for a missing title when the record is indexed.
pub fn parse_procedure(text: &str) -> Procedure {
    let mut proc = Procedure::default();
    let mut section: Option<Section> = None;
    let mut lines = text.lines().map(str::trim).peekable();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }

        if let Some((heading, next_section)) = heading_of(line) {
            let inline = line[heading.len()..].trim();
            match heading {
                "Titulo:" => proc.title = inline.to_string(),
                "Código:" => {
                    // The code is sometimes on its own line under the heading.
                    if inline.is_empty() {
                        if let Some(&next) = lines.peek() {
                            if !next.is_empty() && heading_of(next).is_none() {
                                proc.code = next.to_string();
                                lines.next();
                            }
                        }
                    } else {
                        proc.code = inline.to_string();
                    }
                }
                "Plazo:" => proc.processing_time = inline.to_string(),
                _ => {
                    section = next_section;
                    if section == Some(Section::Description) && !inline.is_empty() {
                        proc.description = inline.to_string();
                    }
                }
            }
            continue;
        }

        match section {
            Some(Section::Description) => append_flow(&mut proc.description, line),
            Some(Section::Requirements) => push_item(&mut proc.requirements, line),
            Some(Section::Channels) => push_item(&mut proc.channels, line),
            Some(Section::Offices) => push_item(&mut proc.offices, line),
            Some(Section::SubmissionUnit) => append_flow(&mut proc.submission_unit, line),
            Some(Section::ApprovalUnit) => append_flow(&mut proc.approval_unit, line),
            Some(Section::Fee) => {
                if let Some(amount) = line.strip_prefix("Monto -") {
                    proc.fee = amount.trim().to_string();
                } else if !proc.payment_methods.iter().any(|m| m == line) {
                    proc.payment_methods.push(line.to_string());
                }
            }
            Some(Section::PaymentMethods) => {
                if !proc.payment_methods.iter().any(|m| m == line) {
                    proc.payment_methods.push(line.to_string());
                }
            }
            Some(Section::Contact) => {
                if let Some(v) = line.strip_prefix("Teléfono:") {
                    proc.contact.phone = v.trim().to_string();
                } else if let Some(v) = line.strip_prefix("Anexo:") {
                    proc.contact.extension = v.trim().to_string();
                } else if let Some(v) = line.strip_prefix("Correo:") {
                    proc.contact.email = v.trim().to_string();
                } else if line.contains('@') {
                    proc.contact.email = line.to_string();
                } else if line.to_lowercase().contains("anexo") {
                    proc.contact.extension = line.to_string();
                } else {
                    proc.contact.phone = line.to_string();
                }
            }
            None => {}
        }
    }

    proc
}

/// A new list item starts on a `1.-` or `-` marker; anything else is a
/// wrapped continuation of the previous item.
fn push_item(items: &mut Vec<String>, line: &str) {
    if LIST_MARKER.is_match(line) || items.is_empty() {
        items.push(line.to_string());
    } else if let Some(last) = items.last_mut() {
        last.push(' ');
        last.push_str(line);
    }
}

fn append_flow(field: &mut String, line: &str) {
    if !field.is_empty() {
        field.push(' ');
    }
    field.push_str(line);
}

/// In-memory collection of procedures with a case-insensitive key index.
///
/// Titles and codes both act as keys. Duplicate titles get a numeric
/// suffix so every record stays addressable.
#[derive(Debug, Default)]
pub struct ProcedureStore {
    procedures: Vec<Procedure>,
    index: HashMap<String, usize>,
}

impl ProcedureStore {
    /// Loads every `.txt` file under `dir`. Unreadable files are logged
    /// and skipped; an empty or missing directory yields an empty store.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::default();
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "procedure directory not found");
            return Ok(store);
        }

        let entries = fs::read_dir(dir)
            .with_context(|| format!("read procedure directory {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
                continue;
            }
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(error) => {
                    tracing::warn!(file = %path.display(), %error, "skipping unreadable procedure file");
                    continue;
                }
            };
            let mut proc = parse_procedure(&text);
            if proc.title.is_empty() {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    proc.title = stem.to_string();
                }
            }
            tracing::debug!(file = %path.display(), title = %proc.title, "loaded procedure");
            store.insert(proc);
        }

        tracing::info!(count = store.len(), dir = %dir.display(), "procedure store loaded");
        Ok(store)
    }

    pub fn insert(&mut self, proc: Procedure) {
        let idx = self.procedures.len();
        let mut key = proc.title.to_lowercase().trim().to_string();
        let base = key.clone();
        let mut counter = 1;
        while self.index.contains_key(&key) {
            key = format!("{base}-{counter}");
            counter += 1;
        }
        self.index.insert(key, idx);

        let code_key = proc.code.to_lowercase().trim().to_string();
        if !code_key.is_empty() && !self.index.contains_key(&code_key) {
            self.index.insert(code_key, idx);
        }
        self.procedures.push(proc);
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.iter()
    }

    /// Looks a procedure up by title or code, case-insensitively.
    pub fn get(&self, key: &str) -> Option<&Procedure> {
        let key = key.to_lowercase().trim().to_string();
        self.index.get(&key).map(|&idx| &self.procedures[idx])
    }

    /// All distinct titles, sorted.
    pub fn titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self
            .procedures
            .iter()
            .filter(|p| !p.title.is_empty())
            .map(|p| p.title.as_str())
            .collect();
        titles.sort_unstable();
        titles.dedup();
        titles
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SAMPLE: &str = "\
Titulo: Licencia de funcionamiento
Código:
LF-001
Descripción del Servicio: Autorización para operar
un establecimiento comercial.
Requisitos:
1.- Solicitud firmada
por el representante legal
2.- Copia de DNI
Canales de atención:
- Mesa de partes
Pago por derecho de tramitación:
Monto - S/ 36.20
Efectivo
Modalidad de pago:
Caja de la municipalidad
Plazo: 15 días hábiles
Sedes y horarios de atención:
- Sede central, lunes a viernes 8:00-16:00
Unidad de organización donde se presenta la documentación:
Mesa de partes
Unidad de organización responsable de aprobar la solicitud:
Gerencia de desarrollo económico
Consulta sobre el servicio:
Teléfono: 051-123456
Anexo: 204
Correo: tramites@municipalidad.gob.pe
";

    #[test]
    fn parses_every_section() {
        let proc = parse_procedure(SAMPLE);
        assert_eq!(proc.title, "Licencia de funcionamiento");
        assert_eq!(proc.code, "LF-001");
        assert_eq!(
            proc.description,
            "Autorización para operar un establecimiento comercial."
        );
        assert_eq!(
            proc.requirements,
            vec![
                "1.- Solicitud firmada por el representante legal",
                "2.- Copia de DNI"
            ]
        );
        assert_eq!(proc.channels, vec!["- Mesa de partes"]);
        assert_eq!(proc.fee, "S/ 36.20");
        assert_eq!(
            proc.payment_methods,
            vec!["Efectivo", "Caja de la municipalidad"]
        );
        assert_eq!(proc.processing_time, "15 días hábiles");
        assert_eq!(proc.submission_unit, "Mesa de partes");
        assert_eq!(proc.approval_unit, "Gerencia de desarrollo económico");
        assert_eq!(proc.contact.phone, "051-123456");
        assert_eq!(proc.contact.extension, "204");
        assert_eq!(proc.contact.email, "tramites@municipalidad.gob.pe");
    }

    #[test]
    fn wrapped_lines_fold_into_previous_item() {
        let proc = parse_procedure(
            "Titulo: X\nRequisitos:\n1.- Primera parte\nsegunda parte\n2.- Otro\n",
        );
        assert_eq!(
            proc.requirements,
            vec!["1.- Primera parte segunda parte", "2.- Otro"]
        );
    }

    #[test]
    fn inline_code_wins_over_next_line() {
        let proc = parse_procedure("Titulo: X\nCódigo: ABC-1\nPlazo: hoy\n");
        assert_eq!(proc.code, "ABC-1");
        assert_eq!(proc.processing_time, "hoy");
    }

    #[test]
    fn load_dir_indexes_by_title_and_code() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("licencia.txt"), SAMPLE).unwrap();
        fs::write(dir.path().join("notas.md"), "ignorado").unwrap();

        let store = ProcedureStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("LICENCIA DE FUNCIONAMIENTO").is_some());
        assert!(store.get("lf-001").is_some());
        assert!(store.get("otro").is_none());
    }

    #[test]
    fn untitled_file_falls_back_to_its_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("partida.txt"), "Plazo: 3 días\n").unwrap();

        let store = ProcedureStore::load_dir(dir.path()).unwrap();
        let proc = store.get("partida").unwrap();
        assert_eq!(proc.title, "partida");
        assert_eq!(proc.processing_time, "3 días");
    }

    #[test]
    fn duplicate_titles_stay_addressable() {
        let mut store = ProcedureStore::default();
        store.insert(Procedure {
            title: "Tramite".to_string(),
            ..Procedure::default()
        });
        store.insert(Procedure {
            title: "Tramite".to_string(),
            code: "T-2".to_string(),
            ..Procedure::default()
        });

        assert_eq!(store.len(), 2);
        assert!(store.get("tramite").is_some());
        assert!(store.get("tramite-1").is_some());
        assert_eq!(store.get("t-2").unwrap().code, "T-2");
    }

    #[test]
    fn missing_dir_yields_empty_store() {
        let store = ProcedureStore::load_dir(Path::new("/nonexistent/procedures")).unwrap();
        assert!(store.is_empty());
        assert!(store.titles().is_empty());
    }
}
