//! Prompt templates sent to the AI provider.
//!
//! Every prompt asks for a single JSON object so the reply can be stored or
//! relayed without further interpretation.

use crate::domain::{bian, UseCase};

pub const ANALYST_SYSTEM: &str = "You are a senior banking business analyst familiar with the \
BIAN (Banking Industry Architecture Network) service landscape. Answer only with a JSON object. \
Write every text value in the same language as the use case.";

pub const SCHEMA_SYSTEM: &str = "You are a data architect for a bank. Answer only with a JSON \
object that is a valid JSON Schema (draft 2020-12).";

fn describe(use_case: &UseCase) -> String {
    let mut out = format!("Title: {}\nDescription:\n{}\n", use_case.title, use_case.original_text);
    if let Some(objective) = &use_case.fields.objective {
        out.push_str(&format!("Objective: {}\n", objective));
    }
    if !use_case.fields.actors.is_empty() {
        out.push_str(&format!("Actors: {}\n", use_case.fields.actors.join(", ")));
    }
    for flow in &use_case.fields.flows {
        out.push_str(&format!("Flow '{}':\n", flow.name));
        for (i, step) in flow.steps.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, step));
        }
    }
    if !use_case.fields.business_rules.is_empty() {
        out.push_str("Business rules:\n");
        for rule in &use_case.fields.business_rules {
            out.push_str(&format!("- {}\n", rule));
        }
    }
    out
}

/// Full analysis of a use case
pub fn analysis(use_case: &UseCase) -> String {
    let catalog: Vec<String> = bian::domains()
        .iter()
        .map(|d| format!("{} ({})", d.id, d.name))
        .collect();

    format!(
        "Analyze the following banking use case.\n\n{}\n\
         Known BIAN service domains: {}.\n\n\
         Return a JSON object with the keys: \"summary\" (string), \"objective\" (string), \
         \"actors\" (array of strings), \"flows\" (array of {{\"name\", \"steps\"}}), \
         \"business_rules\" (array of strings), \"suggested_domains\" (array of domain ids from the list), \
         \"risks\" (array of strings) and \"gaps\" (array of strings).",
        describe(use_case),
        catalog.join(", ")
    )
}

/// Suggestions to improve one field of a use case
pub fn suggestions(use_case: &UseCase, field: &str, context: Option<&str>) -> String {
    let mut prompt = format!(
        "Here is a banking use case.\n\n{}\n\
         Propose improvements for the field \"{}\".",
        describe(use_case),
        field
    );
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("\nAdditional context from the analyst: {}", context));
    }
    prompt.push_str(
        "\nReturn a JSON object with the keys \"field\" (string) and \"suggestions\" \
         (array of {\"value\", \"rationale\"}).",
    );
    prompt
}

/// JSON Schema for an entity the use case handles
pub fn schema(use_case: &UseCase, name: &str, description: Option<&str>) -> String {
    let apis: Vec<String> = use_case
        .selected_apis
        .iter()
        .map(|a| format!("{} {} ({})", a.method, a.path, a.name))
        .collect();

    let mut prompt = format!(
        "Design the JSON Schema for the entity \"{}\" used by this banking use case.\n\n{}\n",
        name,
        describe(use_case)
    );
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        prompt.push_str(&format!("Entity description: {}\n", description));
    }
    if !apis.is_empty() {
        prompt.push_str(&format!("Selected BIAN APIs: {}\n", apis.join("; ")));
    }
    prompt.push_str("Include \"title\", \"type\", \"properties\" and \"required\".");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewUseCase, StructuredFields, UseCaseFlow};
    use uuid::Uuid;

    fn use_case() -> UseCase {
        UseCase::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewUseCase {
                title: "Alta de tarjeta".into(),
                description: "El cliente solicita una tarjeta".into(),
                original_text: None,
                fields: StructuredFields {
                    actors: vec!["Cliente".into(), "Ejecutivo".into()],
                    flows: vec![UseCaseFlow {
                        name: "Principal".into(),
                        steps: vec!["Solicitar".into(), "Aprobar".into()],
                    }],
                    ..Default::default()
                },
            },
        )
    }

    #[test]
    fn test_analysis_prompt_lists_catalog_and_content() {
        let prompt = analysis(&use_case());
        assert!(prompt.contains("Alta de tarjeta"));
        assert!(prompt.contains("card-authorization"));
        assert!(prompt.contains("1. Solicitar"));
        assert!(prompt.contains("Actors: Cliente, Ejecutivo"));
    }

    #[test]
    fn test_suggestions_prompt_skips_blank_context() {
        let prompt = suggestions(&use_case(), "objective", Some("  "));
        assert!(prompt.contains("\"objective\""));
        assert!(!prompt.contains("Additional context"));
    }
}
