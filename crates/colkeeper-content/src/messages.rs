//! User-facing messages.

use std::fmt::Display;

use colkeeper_protocols::AnalysisError;

pub const UNKNOWN_ACTION: &str = "Comando sconosciuto";
pub const NO_TABLES: &str = "Nessuna tabella trovata.";
pub const CONFIG_SAVED: &str = "Configurazione salvata!";
pub const ANALYSIS_FROM_CACHE: &str = "Suggerimenti caricati da cache.";
pub const ANALYSIS_GENERATED: &str = "Suggerimenti generati.";
pub const ANALYSIS_UNAVAILABLE: &str = "Analisi non disponibile.";
pub const SUGGESTION_APPLIED: &str = "Suggerimento applicato.";
pub const SUGGESTION_DISMISSED: &str = "Suggerimento archiviato.";
pub const INVALID_SUGGESTION: &str = "Suggerimento non valido.";

/// Message for a failed analysis, by wire code.
pub fn analysis_failure(error: &AnalysisError) -> &'static str {
    match error.code() {
        "TOKEN_MISSING" => "Token OpenAI non configurato. Imposta OPENAI_API_KEY in storage.",
        "QUOTA" => "Quota API esaurita o limite richieste raggiunto.",
        "TIMEOUT" => "Richiesta scaduta per timeout: riprova tra poco.",
        "SCHEMA_INVALID" => "Il modello ha risposto in formato inatteso.",
        "INVALID_RESPONSE" => "Risposta del modello non valida.",
        "UNAUTHORIZED" => "Token API non valido o revocato.",
        _ => ANALYSIS_UNAVAILABLE,
    }
}

/// Generic failure.
pub fn error(error: impl Display) -> String {
    format!("Errore: {}", error)
}

pub fn preview_hide(fields: &[String]) -> String {
    format!(
        "Anteprima: verranno nascoste {} colonne ({}).",
        fields.len(),
        fields.join(", ")
    )
}

pub fn preview_reorder(fields: &[String]) -> String {
    format!("Anteprima: nuovo ordine {}.", fields.join(" → "))
}

pub fn informational(source_action: &str) -> String {
    format!("Suggerimento informativo: {}.", source_action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_codes_fall_back() {
        assert_eq!(
            analysis_failure(&AnalysisError::Network("reset".to_string())),
            ANALYSIS_UNAVAILABLE
        );
        assert_eq!(
            analysis_failure(&AnalysisError::ConfigInvalid("provider".to_string())),
            ANALYSIS_UNAVAILABLE
        );
    }

    #[test]
    fn test_mapped_codes() {
        assert_eq!(
            analysis_failure(&AnalysisError::SchemaInvalid("x".to_string())),
            "Il modello ha risposto in formato inatteso."
        );
        assert_eq!(
            analysis_failure(&AnalysisError::Timeout(20_000)),
            "Richiesta scaduta per timeout: riprova tra poco."
        );
    }

    #[test]
    fn test_previews() {
        let fields = vec!["iva".to_string(), "note".to_string()];
        assert_eq!(
            preview_hide(&fields),
            "Anteprima: verranno nascoste 2 colonne (iva, note)."
        );
        assert_eq!(preview_reorder(&fields), "Anteprima: nuovo ordine iva → note.");
    }
}
