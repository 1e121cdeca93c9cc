//! Recipes, weekly meal plans and generated shopping lists

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use helpers::{ScriptedModel, TestApp};
use serde_json::{json, Value};

async fn create_recette(app: &TestApp, token: &str, body: Value) -> String {
    let (status, body) = app.post("/api/recettes", token, body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["recette"]["_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_recette_crud_and_validation() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app
        .post(
            "/api/recettes",
            &token,
            json!({ "titre": "Soupe", "ingredients": [{ "nom": "Carotte", "quantite": "3" }, { "quantite": "1" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("ingredients.1.nom: Le nom est requis"));

    let id = create_recette(
        &app,
        &token,
        json!({ "titre": "Soupe", "ingredients": [{ "nom": "Carotte", "quantite": "3" }] }),
    )
    .await;

    let (status, body) = app
        .patch(
            &format!("/api/recettes/{}", id),
            &token,
            json!({ "isFavorite": true, "lastCooked": "2024-05-12T19:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let recette = &body["data"]["recette"];
    assert_eq!(recette["isFavorite"], true);
    assert_eq!(recette["lastCooked"], "2024-05-12T19:00:00Z");
    assert_eq!(recette["type"], "Déjeuner");

    let (_, body) = app.get("/api/recettes", &token).await;
    assert_eq!(body["results"], 1);

    let (status, _) = app.delete(&format!("/api/recettes/{}", id), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/recettes/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_planning_to_shopping_list() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let pates = create_recette(
        &app,
        &token,
        json!({
            "titre": "Pâtes tomate",
            "ingredients": [
                { "nom": "Pâtes", "quantite": "200", "unite": "g" },
                { "nom": "Tomate", "quantite": "2" },
            ],
        }),
    )
    .await;
    let salade = create_recette(
        &app,
        &token,
        json!({
            "titre": "Salade",
            "ingredients": [
                { "nom": "Tomate", "quantite": "3" },
                { "nom": "Huile", "quantite": "1", "unite": "c.à.s" },
            ],
        }),
    )
    .await;

    // No plan yet for that week
    let (status, body) = app
        .post("/api/liste-courses/generer", &token, json!({ "dateDebut": "2024-05-15" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Aucun planning pour cette semaine");

    let (status, body) = app
        .put(
            "/api/planning-semaine",
            &token,
            json!({
                "dateDebut": "2024-05-15",
                "slots": [
                    { "jour": 0, "recetteId": pates },
                    { "jour": 1, "recetteId": salade },
                    { "jour": 2, "recetteId": pates },
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["dateDebut"], "2024-05-13");
    assert_eq!(body["slots"][1]["recetteId"]["titre"], "Salade");

    let (_, body) = app.get("/api/planning-semaine?date=2024-05-19", &token).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 3);

    // A recipe planned twice counts once
    let (status, body) = app
        .post("/api/liste-courses/generer", &token, json!({ "dateDebut": "2024-05-13" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["nom"], "Pâtes");
    assert_eq!(items[0]["quantite"], "200");
    assert_eq!(items[0]["unite"], "g");
    assert_eq!(items[1]["nom"], "Tomate");
    assert_eq!(items[1]["quantite"], "5");
    assert_eq!(items[2]["nom"], "Huile");
    assert!(body["totalEstime"].is_null());
    let liste_id = body["_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .patch(
            &format!("/api/liste-courses/{}/items/1", liste_id),
            &token,
            json!({ "coche": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][1]["coche"], true);
    assert_eq!(body["items"][0]["coche"], false);

    // Out of range: unchanged
    let (status, body) = app
        .patch(
            &format!("/api/liste-courses/{}/items/9", liste_id),
            &token,
            json!({ "coche": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);

    // Non-numeric and negative indexes behave like out-of-range ones
    for index in ["abc", "-1"] {
        let (status, body) = app
            .patch(
                &format!("/api/liste-courses/{}/items/{}", liste_id, index),
                &token,
                json!({ "coche": true }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["items"][0]["coche"], false);
        assert_eq!(body["items"][2]["coche"], false);
    }

    let (status, body) = app
        .put(&format!("/api/liste-courses/{}", liste_id), &token, json!({ "totalEstime": 12.5 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalEstime"], 12.5);

    // An explicit null on the latest list keeps the total
    let (_, body) = app.put("/api/liste-courses", &token, json!({ "totalEstime": null })).await;
    assert_eq!(body["totalEstime"], 12.5);

    let (_, body) = app.get("/api/liste-courses", &token).await;
    assert_eq!(body["_id"], liste_id.as_str());

    let (_, body) = app.get("/api/budget/mensuel?mois=5&annee=2024", &token).await;
    assert_eq!(body["totalListeCourses"], 12.5);
    assert_eq!(body["resteApresCourses"], -12.5);
}

#[tokio::test]
async fn test_empty_shopping_list_shape() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app.get("/api/liste-courses", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "items": [], "totalEstime": null, "dateGeneration": null }));

    let (status, body) = app
        .put("/api/liste-courses/unknown", &token, json!({ "items": [] }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Liste introuvable");
}

#[tokio::test]
async fn test_planning_rejects_bad_slots() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app
        .put(
            "/api/planning-semaine",
            &token,
            json!({ "slots": [{ "jour": 9, "recetteId": "" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("slots.0.jour: Must be between 0 and 6"));
    assert!(message.contains("slots.0.recetteId: L'ID de la recette est requis"));

    let (status, _) = app.put("/api/planning-semaine", &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_recette_falls_back_without_model() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app
        .post("/api/recettes/generate", &token, json!({ "prompt": "un dîner rapide" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recette"]["titre"], "Recette IA (Demo)");
}

#[tokio::test]
async fn test_generate_recette_uses_ingredients_on_hand() {
    let model = Arc::new(ScriptedModel::new(&[
        r#"{"titre": "Omelette", "ingredients": [{"nom": "Oeuf", "quantite": "3", "unite": ""}], "etapes": ["Battre", "Cuire"], "dureeMinutes": 10, "calories": 300}"#,
    ]));
    let app = TestApp::with_model(model.clone()).await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app
        .post(
            "/api/recettes/generate",
            &token,
            json!({ "prompt": "un dîner", "ingredients": ["oeufs", " ", "fromage"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recette"]["titre"], "Omelette");
    assert_eq!(body["data"]["recette"]["type"], "Déjeuner");
    assert_eq!(body["data"]["recette"]["dureeMinutes"], 10);

    let prompts = model.prompts.lock().unwrap();
    let text = format!("{:?}", prompts[0]);
    assert!(text.contains("un dîner avec : oeufs, fromage"));
}

#[tokio::test]
async fn test_seed_recettes_replaces_collection() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    create_recette(&app, &token, json!({ "titre": "Ancienne" })).await;
    let (status, body) = app.post("/api/recettes/seed", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, body) = app.get("/api/recettes", &token).await;
    let recettes = body["data"]["recettes"].as_array().unwrap();
    assert!(!recettes.is_empty());
    assert!(recettes.iter().all(|r| r["titre"] != "Ancienne"));
}
