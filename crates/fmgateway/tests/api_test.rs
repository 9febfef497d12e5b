//! integration tests for the http surface.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use fmgateway::create_app;

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn invoice_json() -> Value {
    json!({
        "document_type": 33,
        "folio": 2404,
        "issue_date": "2025-05-05",
        "issuer": {
            "code": "76212889-6",
            "name": "FACTURA MOVIL SPA",
            "address": "Vicuña Mackenna 9705, La Florida, Santiago"
        },
        "receiver": {
            "code": "77371419-3",
            "name": "AGRICOLA PAINE LTDA",
            "address": ""
        },
        "details": [{
            "quantity": 0.9,
            "description": "Plan Emprendedor  - Abril 2025",
            "unit_price": 39107.9,
            "line_total": 35197.0
        }],
        "totals": { "taxable": 35197.0, "tax": 6687.0, "total": 41884.0 }
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = create_app(common::setup_state(&dir).await);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "pass");
}

#[tokio::test]
async fn test_company_create_and_list() {
    let dir = TempDir::new().unwrap();
    let app = create_app(common::setup_state(&dir).await);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/companies")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"code": "76212889-6", "name": "FACTURA MOVIL SPA", "address": "Santiago"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["code"], "76212889-6");
    let id = created["id"].as_str().unwrap().to_string();

    // filtered listing finds it case-insensitively
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/companies?name=movil")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // direct fetch by id
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/companies/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_caf_upload_iso_8859_1() {
    let dir = TempDir::new().unwrap();
    let state = common::setup_state(&dir).await;
    let company = common::register_company(&state, "76212889-6", "COMPAÑIA DE PRUEBA").await;
    let app = create_app(state);

    let caf = common::test_caf_xml("76212889-6", "COMPAÑIA DE PRUEBA", 33, 1, 100);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/companies/{}/cafs", company.id))
                .header(header::CONTENT_TYPE, "application/xml")
                .body(Body::from(caf.xml))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["company_code"], "76212889-6");
    assert_eq!(body["document_type"], 33);
    assert_eq!(body["initial_folio"], 1);
    assert_eq!(body["final_folio"], 100);
    assert_eq!(body["current_folio"], 1);
    assert_eq!(body["status"], "OPEN");
    // key material never leaves the server
    assert!(body.get("private_key").is_none());
    assert!(body.get("raw").is_none());

    // the caf shows up in the listing
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/companies/{}/cafs", company.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_caf_upload_unknown_company_is_404() {
    let dir = TempDir::new().unwrap();
    let app = create_app(common::setup_state(&dir).await);

    let caf = common::test_caf_xml("76212889-6", "X", 33, 1, 10);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/companies/does-not-exist/cafs")
                .body(Body::from(caf.xml))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_caf_upload_malformed_xml_is_400() {
    let dir = TempDir::new().unwrap();
    let state = common::setup_state(&dir).await;
    let company = common::register_company(&state, "76212889-6", "X").await;
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/companies/{}/cafs", company.id))
                .body(Body::from("not xml"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stamp_endpoint_returns_ted_xml() {
    let dir = TempDir::new().unwrap();
    let state = common::setup_state(&dir).await;
    let company = common::register_company(&state, "76212889-6", "FACTURA MOVIL SPA").await;
    common::ingest_caf(&state, &company, 33, 2400, 2500).await;
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/companies/{}/stamps", company.id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(invoice_json().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("application/xml"));
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("<TED version=\"1.0\">"));
    assert!(body.contains("<F>2400</F>"));
    assert!(body.contains("<FRMT algoritmo=\"SHA1withRSA\">"));
}

#[tokio::test]
async fn test_stamp_endpoint_pdf417_format() {
    let dir = TempDir::new().unwrap();
    let state = common::setup_state(&dir).await;
    let company = common::register_company(&state, "76212889-6", "FACTURA MOVIL SPA").await;
    common::ingest_caf(&state, &company, 33, 1, 100).await;
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/companies/{}/stamps?format=pdf417", company.id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(invoice_json().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let png = body_bytes(response).await;
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_stamp_endpoint_envelope() {
    let dir = TempDir::new().unwrap();
    let state = common::setup_state(&dir).await;
    let company = common::register_company(&state, "76212889-6", "FACTURA MOVIL SPA").await;
    common::ingest_caf(&state, &company, 33, 7, 100).await;
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/companies/{}/stamps?include_barcode=true",
                    company.id
                ))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(invoice_json().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["folio"], 7);
    assert!(body["ted_xml"].as_str().unwrap().contains("<TED"));
    assert!(!body["pdf417_png"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_stamp_endpoint_no_caf_is_404() {
    let dir = TempDir::new().unwrap();
    let state = common::setup_state(&dir).await;
    let company = common::register_company(&state, "76212889-6", "FACTURA MOVIL SPA").await;
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/companies/{}/stamps", company.id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(invoice_json().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_activities_endpoints() {
    let dir = TempDir::new().unwrap();
    let state = common::setup_state(&dir).await;
    let company = common::register_company(&state, "76212889-6", "FACTURA MOVIL SPA").await;
    let app = create_app(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/companies/{}/activities", company.id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"code": "523930", "description": "Comercio al por menor"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let activity = body_json(response).await;
    let activity_id = activity["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/companies/{}/activities", company.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!(
                    "/companies/{}/activities/{activity_id}",
                    company.id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
