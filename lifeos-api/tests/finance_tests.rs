//! Accounts, transactions, expenses, income, budget and AI finance endpoints

mod helpers;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use helpers::{ScriptedModel, TestApp};
use lifeos_api::db;
use lifeos_api::models::{new_id, Depense};
use lifeos_api::services::ai::PromptPart;
use lifeos_api::services::budget_monitor;
use serde_json::json;

#[tokio::test]
async fn test_transactions_move_account_balance() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app
        .post(
            "/api/accounts",
            &token,
            json!({ "name": "Compte courant", "type": "Principal", "balance": 100.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let account_id = body["data"]["account"]["_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            "/api/transactions",
            &token,
            json!({
                "title": "Courses",
                "amount": 30.0,
                "type": "DEBIT",
                "category": "Alimentation",
                "accountId": account_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["newBalance"], 70.0);

    let (_, body) = app
        .post(
            "/api/transactions",
            &token,
            json!({
                "title": "Salaire",
                "amount": 50.0,
                "type": "CREDIT",
                "category": "Salaire",
                "accountId": account_id,
            }),
        )
        .await;
    assert_eq!(body["data"]["newBalance"], 120.0);

    let (status, body) = app
        .get(&format!("/api/transactions/account/{}", account_id), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 2);
    assert_eq!(body["data"]["transactions"][0]["account"]["name"], "Compte courant");

    let (_, body) = app.get("/api/accounts", &token).await;
    assert_eq!(body["data"]["accounts"][0]["balance"], 120.0);
}

#[tokio::test]
async fn test_transaction_validation() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app
        .post(
            "/api/transactions",
            &token,
            json!({ "title": "Prêt", "amount": -5.0, "type": "LOAN", "category": "Autre", "accountId": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Validation Error:"));
    assert!(message.contains("amount: Amount must be positive"));
    assert!(message.contains("type: Invalid enum value"));

    let (status, body) = app
        .post(
            "/api/transactions",
            &token,
            json!({ "title": "Café", "amount": 2.5, "type": "DEBIT", "category": "Alimentation", "accountId": "missing" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Account not found");
}

#[tokio::test]
async fn test_accounts_are_private_to_their_owner() {
    let app = TestApp::new().await;
    let ana = app.register("ana@example.org").await;
    let bob = app.register("bob@example.org").await;

    let (_, body) = app
        .post("/api/accounts", &ana, json!({ "name": "Livret", "type": "Épargne" }))
        .await;
    let account_id = body["data"]["account"]["_id"].as_str().unwrap().to_string();

    let (status, _) = app
        .patch(&format!("/api/accounts/{}", account_id), &bob, json!({ "balance": 1.0 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/accounts", &bob).await;
    assert_eq!(body["results"], 0);
}

#[tokio::test]
async fn test_monthly_budget_summary() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, _) = app
        .post(
            "/api/revenus",
            &token,
            json!({ "libelle": "Salaire", "montant": 2000.0, "mois": 5, "annee": 2024 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/depenses",
            &token,
            json!({ "libelle": "Loyer", "montant": 500.0, "date": "2024-05-10T12:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["mois"], 5);
    assert_eq!(body["annee"], 2024);
    assert_eq!(body["categorie"], "Divers");

    let (status, body) = app.get("/api/budget/mensuel?mois=5&annee=2024", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRevenus"], 2000.0);
    assert_eq!(body["totalDepenses"], 500.0);
    assert_eq!(body["resteAVivre"], 1500.0);
    assert_eq!(body["totalListeCourses"], 0.0);
    assert!(body["resteApresCourses"].is_null());

    let (_, body) = app.get("/api/depenses?mois=6&annee=2024", &token).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (status, _) = app.get("/api/budget/mensuel?mois=13", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_expense_and_income() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (_, body) = app
        .post("/api/depenses", &token, json!({ "libelle": "Cinéma", "montant": 12.0 }))
        .await;
    let id = body["_id"].as_str().unwrap().to_string();

    let (status, body) = app.delete(&format!("/api/depenses/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dépense supprimée");

    let (status, body) = app.delete(&format!("/api/depenses/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Dépense introuvable");

    let (status, body) = app
        .post("/api/revenus", &token, json!({ "libelle": "Prime", "montant": 100.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = app.delete("/api/revenus/unknown", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Revenu introuvable");
}

#[tokio::test]
async fn test_budget_alert_notifications() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (_, me) = app.get("/api/auth/me", &token).await;
    let user_id = me["data"]["_id"].as_str().unwrap().to_string();

    // Stored directly so no background check races the one below
    let depense = Depense {
        id: new_id(),
        user_id: user_id.clone(),
        libelle: "Vacances".to_string(),
        montant: 950.0,
        categorie: "Loisirs".to_string(),
        date: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
        mois: 3,
        annee: 2024,
        created_at: Utc::now(),
    };
    db::depenses::insert_depense(&app.pool, &depense).await.unwrap();
    app.post(
        "/api/revenus",
        &token,
        json!({ "libelle": "Salaire", "montant": 1000.0, "mois": 3, "annee": 2024 }),
    )
    .await;

    let created = budget_monitor::check_budget_health(&app.pool, &user_id, 3, 2024)
        .await
        .unwrap();
    assert!(created.is_some());
    // Only one unread alert per threshold
    let again = budget_monitor::check_budget_health(&app.pool, &user_id, 3, 2024)
        .await
        .unwrap();
    assert!(again.is_none());

    let (status, body) = app.get("/api/notifications", &token).await;
    assert_eq!(status, StatusCode::OK);
    let notifications = body.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "budget_alert");
    let id = notifications[0]["_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .patch(&format!("/api/notifications/{}/read", id), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, body) = app.get("/api/notifications", &token).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = app
        .patch("/api/notifications/unknown/read", &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.post("/api/notifications/clear", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 0);
}

#[tokio::test]
async fn test_scan_requires_image() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let boundary = "lifeos-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/depenses/scan")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = app.send_request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Veuillez fournir une image de ticket.");
}

#[tokio::test]
async fn test_scan_sends_image_to_model() {
    let model = Arc::new(ScriptedModel::new(&[
        "```json\n{\"montant\": 23.4, \"date\": \"2024-05-02\", \"libelle\": \"Carrefour\", \"categorie\": \"Alimentation\"}\n```",
    ]));
    let app = TestApp::with_model(model.clone()).await;
    let token = app.register("ana@example.org").await;

    let boundary = "lifeos-boundary";
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"ticket.png\"\r\nContent-Type: image/png\r\n\r\n",
        b = boundary
    )
    .into_bytes();
    body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/api/depenses/scan")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = app.send_request(request).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["montant"], 23.4);
    assert_eq!(body["data"]["libelle"], "Carrefour");

    let prompts = model.prompts.lock().unwrap();
    assert!(matches!(
        &prompts[0][1],
        PromptPart::InlineImage { mime_type, data } if mime_type == "image/png" && data.len() == 4
    ));
}

#[tokio::test]
async fn test_financial_analysis() {
    let model = Arc::new(ScriptedModel::new(&[
        r#"{"predictions": "Stable", "alerts": [], "savingsTips": ["Cuisiner plus"], "investmentIdeas": [], "financialHealthScore": 72}"#,
    ]));
    let app = TestApp::with_model(model).await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app.post("/api/ai/analyze", &token, json!({ "month": 0, "year": 2024 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Veuillez fournir le mois et l'année.");

    let (status, body) = app.post("/api/ai/analyze", &token, json!({ "month": 5, "year": 2024 })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["financialHealthScore"], 72.0);
    assert_eq!(body["data"]["savingsTips"][0], "Cuisiner plus");

    // Script exhausted: the model now fails
    let (status, body) = app.post("/api/ai/analyze", &token, json!({ "month": 5, "year": 2024 })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_account_sync_keeps_transaction_history() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (_, body) = app
        .post("/api/accounts", &token, json!({ "name": "Ancien compte", "balance": 200.0 }))
        .await;
    let account_id = body["data"]["account"]["_id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/api/transactions",
            &token,
            json!({
                "title": "Loyer",
                "amount": 150.0,
                "type": "DEBIT",
                "category": "Logement",
                "accountId": account_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/accounts/sync", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Accounts re-synced with bank data");
    let accounts = body["data"]["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 4);
    assert_eq!(accounts[0]["name"], "Compte Principal");
    assert!(accounts.iter().all(|a| a["_id"] != account_id.as_str()));

    let (_, body) = app.get("/api/accounts", &token).await;
    assert_eq!(body["results"], 4);

    // The old account is gone but its transactions remain
    let (status, body) = app.get("/api/transactions", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 1);
    let transaction = &body["data"]["transactions"][0];
    assert_eq!(transaction["title"], "Loyer");
    assert_eq!(transaction["accountId"], account_id.as_str());
    assert!(transaction["account"].is_null());
}
