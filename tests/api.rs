use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use previdencia_backend::{app, config::AppState};

fn router() -> Router {
    app(AppState::in_memory())
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri).header("x-user-name", "Dra. Ana");
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create_case(router: &Router, view: &str, column: &str, benefit: &str) -> i64 {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/cases",
        Some(json!({
            "clientName": "Maria da Silva",
            "cpf": "529.982.247-25",
            "view": view,
            "columnId": column,
            "benefitType": benefit
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_and_openapi() {
    let router = router();
    let (status, body) = send(&router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));

    let (status, doc) = send(&router, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/cases/{id}/move"].is_object());
    assert_eq!(doc["components"]["schemas"]["TransitionRule"]["properties"]["from"]["type"], "string");
}

#[tokio::test]
async fn test_invalid_cpf_is_rejected() {
    let router = router();
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/cases",
        Some(json!({ "clientName": "Maria", "cpf": "111.111.111-11" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["cpf"].is_array());
}

#[tokio::test]
async fn test_exam_move_requires_form_then_commits() {
    let router = router();
    let id = create_case(&router, "AUX_DOENCA", "aux_chegada", "31").await;

    // Sem formulário: o preview mostra o que falta e o commit é recusado
    let (status, preview) = send(
        &router,
        Method::POST,
        &format!("/api/cases/{id}/move/preview"),
        Some(json!({ "targetColumn": "aux_pericia" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["transition"], "PROTOCOL_INSS");
    assert_eq!(preview["requiresExamDate"], true);
    assert_eq!(preview["canConfirm"], false);
    assert_eq!(preview["missingFields"], json!(["protocolNumber", "protocolDate", "periciaDate"]));

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/api/cases/{id}/move"),
        Some(json!({ "targetColumn": "aux_pericia" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, unchanged) = send(&router, Method::GET, &format!("/api/cases/{id}"), None).await;
    assert_eq!(unchanged["columnId"], "aux_chegada");

    let (status, result) = send(
        &router,
        Method::POST,
        &format!("/api/cases/{id}/move"),
        Some(json!({
            "targetColumn": "aux_pericia",
            "draft": {
                "protocolNumber": "555",
                "protocolDate": "2024-02-01",
                "periciaDate": "2024-02-20T09:00"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{result}");
    let case = &result["case"];
    assert_eq!(case["view"], "AUX_DOENCA");
    assert_eq!(case["columnId"], "aux_pericia");
    assert_eq!(case["protocolNumber"], "555");
    assert_eq!(case["protocolDate"], "2024-02-01");
    assert_eq!(case["periciaDate"], "2024-02-20T09:00:00");
    let last = case["history"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["transition"], "PROTOCOL_INSS");
    assert_eq!(last["user"], "Dra. Ana");
}

#[tokio::test]
async fn test_zone_drop_adds_checklist() {
    let router = router();
    let id = create_case(&router, "MESA_DECISAO", "mesa_analise", "41").await;

    let (status, highlights) = send(&router, Method::GET, &format!("/api/cases/{id}/highlights"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(highlights, json!([]));

    let (status, result) = send(
        &router,
        Method::POST,
        &format!("/api/cases/{id}/move"),
        Some(json!({ "targetColumn": "zone_judicial" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{result}");
    assert_eq!(result["case"]["view"], "JUDICIAL");
    assert_eq!(result["case"]["columnId"], "jud_triagem");
    assert_eq!(result["case"]["tasks"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_partial_merge_keeps_other_fields() {
    let router = router();
    let id = create_case(&router, "ADMIN", "adm_triagem", "41").await;

    let (status, _) = send(
        &router,
        Method::PATCH,
        &format!("/api/cases/{id}"),
        Some(json!({ "benefitNumber": "NB1", "phone": "51999990000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, case) = send(
        &router,
        Method::PATCH,
        &format!("/api/cases/{id}"),
        Some(json!({ "protocolNumber": "123", "phone": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["protocolNumber"], "123");
    assert_eq!(case["benefitNumber"], "NB1");
    assert!(case["phone"].is_null());
}

#[tokio::test]
async fn test_board_and_suggestions() {
    let router = router();
    let id = create_case(&router, "MESA_DECISAO", "mesa_analise", "41").await;

    let (status, actions) = send(&router, Method::GET, &format!("/api/cases/{id}/actions"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(actions["actions"].as_array().unwrap().len(), 3);

    let (status, board) = send(&router, Method::GET, "/api/board/MESA_DECISAO", None).await;
    assert_eq!(status, StatusCode::OK);
    let columns = board["columns"].as_array().unwrap();
    let desk = columns.iter().find(|c| c["column"]["id"] == "mesa_analise").unwrap();
    assert_eq!(desk["cases"].as_array().unwrap().len(), 1);
    assert_eq!(desk["cases"][0]["health"]["caseId"], id);

    let (status, _) = send(&router, Method::GET, "/api/cases/999/health", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_round_trip() {
    let router = router();
    let (status, settings) = send(&router, Method::GET, "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["sla_mandado_seguranca"], 120);

    let (status, _) = send(&router, Method::PUT, "/api/settings", Some(json!({ "pp_alert_days": 400 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, updated) = send(&router, Method::PUT, "/api/settings", Some(json!({ "sla_stagnation": 60 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["sla_stagnation"], 60);
    assert_eq!(updated["sla_client_contact"], 30);
}

#[tokio::test]
async fn test_backup_export_and_csv() {
    let router = router();
    create_case(&router, "ADMIN", "adm_triagem", "41").await;

    let (status, backup) = send(&router, Method::GET, "/api/backup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backup["version"], "1.0");
    assert_eq!(backup["data"]["cases"].as_array().unwrap().len(), 1);

    let fresh = self::router();
    let (status, summary) = send(&fresh, Method::POST, "/api/backup", Some(backup)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["cases"], 1);

    let (status, csv) = send(&fresh, Method::GET, "/api/backup/cases.csv", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(csv.as_str().unwrap().contains("529.982.247-25"));
}

#[tokio::test]
async fn test_appointment_lifecycle() {
    let router = router();
    let (status, user) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(json!({ "name": "Dra. Ana", "role": "LAWYER" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, appointment) = send(
        &router,
        Method::POST,
        "/api/appointments",
        Some(json!({
            "clientName": "Maria da Silva",
            "lawyerId": user["id"],
            "dateTime": "2024-02-20T14:30",
            "type": "IN_PERSON"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{appointment}");
    let id = appointment["id"].as_str().unwrap().to_string();

    let (status, cancelled) = send(&router, Method::POST, &format!("/api/appointments/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");

    let (_, active) = send(&router, Method::GET, "/api/appointments", None).await;
    assert_eq!(active, json!([]));
    let (_, all) = send(&router, Method::GET, "/api/appointments?includeCancelled=true", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}
