//! Reply policy over the knowledge base.
//!
//! The responder is total: every message maps to some [`BotReply`].
//! Routing, from strongest to weakest signal: exact title or code match
//! (a clicked suggestion comes back verbatim), direct answer for a clear
//! winner, a suggestion list when the query is broad, and canned guidance
//! when nothing matches.

use crate::backend::BotReply;

use super::search::{
    self, MAX_SUGGESTIONS, MIN_SUGGESTION_SCORE, NO_MATCH_THRESHOLD, STRONG_MATCH_THRESHOLD,
};
use super::store::{Procedure, ProcedureStore};

const OFF_TOPIC_REPLY: &str =
    "Disculpa, mi función se limita a brindarte información sobre **procedimientos \
     administrativos** de la municipalidad. Por favor, intenta preguntar sobre un \
     trámite específico.";

const NO_RESULTS_REPLY: &str =
    "Disculpa, no encontré un procedimiento que coincida con tu búsqueda. Por favor, \
     intenta con otras palabras clave o sé más específico.";

const SUGGESTIONS_PROMPT: &str =
    "He encontrado varias opciones que podrían ser relevantes para tu búsqueda. \
     ¿Te refieres a alguna de estas?";

/// Answers questions from the local procedure store.
#[derive(Debug)]
pub struct KbResponder {
    store: ProcedureStore,
}

impl KbResponder {
    pub fn new(store: ProcedureStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ProcedureStore {
        &self.store
    }

    pub fn respond(&self, message: &str) -> BotReply {
        // Clicked suggestions arrive as the exact title.
        if let Some(proc) = self.store.get(message) {
            tracing::debug!(title = %proc.title, "exact key match");
            return BotReply::Text {
                response: format_details(proc),
            };
        }

        let cleaned = search::clean_query(message);
        let matches = search::find_matches(&self.store, &cleaned);

        let top_score = matches.first().map_or(0, |&(s, _)| s);
        if top_score < NO_MATCH_THRESHOLD {
            tracing::debug!(%cleaned, top_score, "off-topic query");
            return BotReply::Text {
                response: OFF_TOPIC_REPLY.to_string(),
            };
        }

        // A short, broad query with several plausible answers gets a
        // suggestion list even when the top score is strong.
        let word_count = cleaned.split_whitespace().count();
        let broad_query = word_count <= 3 || cleaned.chars().count() < 8;
        let good_matches = matches
            .iter()
            .filter(|&(s, _)| *s >= MIN_SUGGESTION_SCORE)
            .count();
        let force_suggestions = broad_query && good_matches > 1;

        if top_score >= STRONG_MATCH_THRESHOLD && !force_suggestions {
            let proc = matches[0].1;
            tracing::debug!(title = %proc.title, top_score, "strong match");
            return BotReply::Text {
                response: format_details(proc),
            };
        }

        let suggestions = suggestion_titles(&matches);
        if suggestions.is_empty() {
            BotReply::Text {
                response: NO_RESULTS_REPLY.to_string(),
            }
        } else {
            BotReply::Suggestions {
                message: SUGGESTIONS_PROMPT.to_string(),
                suggestions,
            }
        }
    }
}

fn suggestion_titles(matches: &[(i32, &Procedure)]) -> Vec<String> {
    let mut titles = Vec::new();
    let mut seen = Vec::new();
    for &(score, proc) in matches {
        if score < MIN_SUGGESTION_SCORE || proc.title.is_empty() {
            continue;
        }
        let key = proc.title.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        titles.push(proc.title.clone());
        if titles.len() >= MAX_SUGGESTIONS {
            break;
        }
    }
    titles
}

/// Renders the full procedure record in the reply markup subset.
pub fn format_details(proc: &Procedure) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push("El trámite que desea es este:".to_string());
    parts.push(format!("**Procedimiento:** {}", fallback(&proc.title)));
    parts.push(format!("**Código:** {}", fallback(&proc.code)));
    if proc.description.is_empty() {
        parts.push("**Descripción:** No se encontró una descripción detallada.".to_string());
    } else {
        parts.push(format!("**Descripción:** {}", proc.description));
    }

    parts.push("\n**Requisitos:**".to_string());
    push_list(&mut parts, &proc.requirements, "No se encontraron requisitos.");

    parts.push("\n**Canales de Atención:**".to_string());
    push_list(&mut parts, &proc.channels, "No se especificaron canales.");

    parts.push("\n**Pago por Derecho de Tramitación:**".to_string());
    if !proc.fee.is_empty() {
        parts.push(format!("- **Monto:** {}", proc.fee));
    }
    if proc.payment_methods.is_empty() {
        if proc.fee.is_empty() {
            parts.push("- Información de pago no especificada.".to_string());
        }
    } else {
        parts.push(format!(
            "- **Modalidad de Pago:** {}",
            proc.payment_methods.join(", ")
        ));
    }

    parts.push(format!("\n**Plazo:** {}", fallback(&proc.processing_time)));

    parts.push("\n**Sedes y Horarios de Atención:**".to_string());
    push_list(&mut parts, &proc.offices, "No se especificaron sedes u horarios.");

    parts.push(format!(
        "\n**Unidad donde se presenta la documentación:** {}",
        fallback(&proc.submission_unit)
    ));
    parts.push(format!(
        "**Unidad responsable de aprobar:** {}",
        fallback(&proc.approval_unit)
    ));

    parts.push("\n**Consulta sobre el Servicio:**".to_string());
    let mut any_contact = false;
    if !proc.contact.phone.is_empty() {
        let mut line = format!("- Teléfono: {}", proc.contact.phone);
        if !proc.contact.extension.is_empty() {
            line.push_str(&format!(" Anexo: {}", proc.contact.extension));
        }
        parts.push(line);
        any_contact = true;
    }
    if !proc.contact.email.is_empty() {
        parts.push(format!("- Correo: {}", proc.contact.email));
        any_contact = true;
    }
    if !any_contact {
        parts.push("- Información de contacto no especificada.".to_string());
    }

    parts.join("\n")
}

fn fallback(field: &str) -> &str {
    if field.is_empty() { "No disponible" } else { field }
}

fn push_list(parts: &mut Vec<String>, items: &[String], empty_note: &str) {
    if items.is_empty() {
        parts.push(format!("- {empty_note}"));
    } else {
        for item in items {
            let line = item.trim_start_matches(['-', ' ']);
            parts.push(format!("- {line}"));
        }
    }
}
