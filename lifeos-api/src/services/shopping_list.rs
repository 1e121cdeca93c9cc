//! Grocery list aggregation over a week of planned meals
//!
//! Ingredients are merged by `nom|unite`. Quantities of the same key are summed;
//! the same ingredient in two different units stays on two lines.

use std::collections::HashMap;

use crate::models::{ItemCourse, Recette};

/// Numeric value of a free-text quantity
///
/// Accepts `2`, `1.5`, `1,5` and fractions such as `1/2`, optionally followed by
/// text (`200 g`). Anything else counts as one unit.
pub fn parse_quantity(raw: &str) -> f64 {
    let token: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '/'))
        .collect();
    let token = token.replace(',', ".");

    let value = match token.split_once('/') {
        Some((num, den)) => match (num.parse::<f64>(), den.parse::<f64>()) {
            (Ok(n), Ok(d)) if d != 0.0 => Some(n / d),
            _ => None,
        },
        None => token.parse::<f64>().ok(),
    };

    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 1.0,
    }
}

/// Render a summed quantity without trailing zeros (`2`, `0.5`, `1.333`)
pub fn format_quantity(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{:.3}", rounded);
        text.trim_end_matches('0').to_string()
    }
}

/// Merge the ingredients of `recettes` into unchecked, unpriced list items,
/// in order of first appearance
pub fn aggregate_ingredients<'a, I>(recettes: I) -> Vec<ItemCourse>
where
    I: IntoIterator<Item = &'a Recette>,
{
    let mut order: Vec<(String, String)> = Vec::new();
    let mut totals: HashMap<(String, String), f64> = HashMap::new();

    for recette in recettes {
        for ingredient in &recette.ingredients {
            let unite = ingredient.unite.trim().to_string();
            let key = (ingredient.nom.clone(), unite.clone());
            let entry = totals.entry(key).or_insert_with(|| {
                order.push((ingredient.nom.clone(), unite.clone()));
                0.0
            });
            *entry += parse_quantity(&ingredient.quantite);
        }
    }

    order
        .into_iter()
        .map(|(nom, unite)| {
            let total = totals.get(&(nom.clone(), unite.clone())).copied().unwrap_or(0.0);
            ItemCourse {
                nom,
                quantite: format_quantity(total),
                unite,
                prix: None,
                coche: false,
            }
        })
        .collect()
}

/// Sum of item prices, `None` when nothing is priced
pub fn estimate_total(items: &[ItemCourse]) -> Option<f64> {
    let total: f64 = items.iter().filter_map(|i| i.prix).sum();
    (total != 0.0).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;
    use chrono::Utc;

    fn ingredient(nom: &str, quantite: &str, unite: &str) -> Ingredient {
        Ingredient {
            nom: nom.into(),
            quantite: quantite.into(),
            unite: unite.into(),
        }
    }

    fn recette(ingredients: Vec<Ingredient>) -> Recette {
        Recette {
            id: "r".into(),
            user_id: "u".into(),
            titre: "t".into(),
            kind: "Déjeuner".into(),
            image: None,
            ingredients,
            etapes: Vec::new(),
            duree_minutes: Some(10),
            cuisson_minutes: 0,
            calories: None,
            proteines: None,
            glucides: None,
            lipides: None,
            is_favorite: false,
            last_cooked: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("2"), 2.0);
        assert_eq!(parse_quantity("1,5"), 1.5);
        assert_eq!(parse_quantity("1/2"), 0.5);
        assert_eq!(parse_quantity("200 g"), 200.0);
        assert_eq!(parse_quantity("une pincée"), 1.0);
        assert_eq!(parse_quantity("1/0"), 1.0);
        assert_eq!(parse_quantity(""), 1.0);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(1.0 / 3.0), "0.333");
    }

    #[test]
    fn test_same_unit_sums_and_different_unit_splits() {
        let a = recette(vec![
            ingredient("Riz", "100", "g"),
            ingredient("Oignons", "2", ""),
        ]);
        let b = recette(vec![
            ingredient("Riz", "150", "g"),
            ingredient("Riz", "1", "sachet"),
            ingredient("Avocat", "1/2", ""),
        ]);

        let items = aggregate_ingredients([&a, &b]);
        let lines: Vec<(&str, &str, &str)> = items
            .iter()
            .map(|i| (i.nom.as_str(), i.quantite.as_str(), i.unite.as_str()))
            .collect();

        assert_eq!(
            lines,
            vec![
                ("Riz", "250", "g"),
                ("Oignons", "2", ""),
                ("Riz", "1", "sachet"),
                ("Avocat", "0.5", ""),
            ]
        );
        assert!(items.iter().all(|i| !i.coche && i.prix.is_none()));
    }

    #[test]
    fn test_estimate_total() {
        let mut items = aggregate_ingredients([&recette(vec![ingredient("Lait", "1", "L")])]);
        assert_eq!(estimate_total(&items), None);
        items[0].prix = Some(1.2);
        assert_eq!(estimate_total(&items), Some(1.2));
    }
}
