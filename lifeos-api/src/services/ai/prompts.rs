//! Prompt texts sent to the generative model

use serde::Serialize;

use crate::models::RECETTE_TYPES;

/// Categories offered to the model when reading a receipt
pub const RECEIPT_CATEGORIES: [&str; 5] = ["Alimentation", "Transport", "Logement", "Loisirs", "Divers"];

pub fn receipt_scan() -> String {
    format!(
        r#"Analyse ce ticket de caisse et extrais les informations suivantes en JSON strictement :
- montant (number)
- date (string YYYY-MM-DD, si absente utiliser date du jour)
- libelle (string, nom du commerçant/magasin)
- categorie (string, choisis parmi : {})

Réponds UNIQUEMENT avec le JSON, pas de markdown."#,
        RECEIPT_CATEGORIES.join(", ")
    )
}

pub fn financial_analysis<C: Serialize>(context: &C) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string(context)?;
    Ok(format!(
        r#"Tu es un expert financier personnel. Analyse les données financières suivantes (revenus et dépenses sur 3 mois) et fournis une réponse structurée en JSON.

Données:
{data}

Ta réponse DOIT être un JSON valide avec la structure suivante (sans markdown, juste le JSON pur) :
{{
  "predictions": "Texte court prédisant la fin du mois basé sur les habitudes",
  "alerts": [
    {{ "category": "NomCategorie", "message": "Message d'alerte spécifique", "severity": "high/medium/low" }}
  ],
  "savingsTips": ["Conseil 1", "Conseil 2"],
  "investmentIdeas": ["Idée 1 bas risque", "Idée 2 moyen risque"],
  "financialHealthScore": 0-100
}}

Sois bienveillant mais direct. Donne des conseils actionnables."#
    ))
}

pub fn life_context<C: Serialize>(context: &C, user_prompt: &str) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string_pretty(context)?;
    Ok(format!(
        r#"Tu es "Agent Core", l'assistant IA central de LifeOS. Ton rôle est d'être un "Life Architect" proactif, bienveillant et holistique.
Tu as accès à une vue complète de la vie de l'utilisateur (Finances, Santé, Agenda, Projets).

CONTEXTE ACTUEL :
{data}

QUESTION DE L'UTILISATEUR (optionnelle) : "{user_prompt}"

Analyse ce contexte global. Si l'utilisateur pose une question, réponds-y en croisant ces données.
Sinon, génère un briefing pour le tableau de bord. Ton professionnel mais détendu, tutoiement.

Réponds en JSON pur avec cette structure :
{{
  "greeting": "Phrase d'accroche contextuelle",
  "message": "Le corps du conseil ou de la réponse.",
  "actionItem": "Une action concrète suggérée.",
  "priority": "high" | "normal" | "low",
  "widgetsToHighlight": ["budget" | "calendar" | "sport" | "projets"],
  "lifeBattery": {{
    "score": 0-100,
    "status": "Excellent" | "Bon" | "Moyen" | "Critique",
    "physical": 0-100,
    "mental": 0-100,
    "financial": 0-100
  }}
}}"#
    ))
}

pub fn recipe(user_prompt: &str) -> String {
    let request = if user_prompt.trim().is_empty() {
        "une recette équilibrée et rapide"
    } else {
        user_prompt.trim()
    };
    format!(
        r#"Propose {request}.
Réponds UNIQUEMENT avec un JSON de la forme :
{{
  "titre": "string",
  "type": "{types}",
  "ingredients": [{{ "nom": "string", "quantite": "string", "unite": "string" }}],
  "etapes": ["string"],
  "dureeMinutes": number,
  "calories": number
}}"#,
        types = RECETTE_TYPES.join("\" | \""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analysis_prompt_embeds_context() {
        let prompt = financial_analysis(&json!({"currentMonth": "5/2024"})).unwrap();
        assert!(prompt.contains(r#"{"currentMonth":"5/2024"}"#));
        assert!(prompt.contains("\"financialHealthScore\""));
    }

    #[test]
    fn test_recipe_prompt_defaults_request() {
        assert!(recipe("  ").starts_with("Propose une recette équilibrée"));
        assert!(recipe("un curry").starts_with("Propose un curry."));
    }
}
