use swarm_catalog::data::catalog::Catalog;
use swarm_catalog::data::product::Product;
use swarm_catalog::server::routes::route_request;

fn catalog() -> Catalog {
    Catalog::from_products([
        Product {
            product_id: "SW-MAGx_LR_1B".to_string(),
            name: "Magnetic field (1Hz) from VFM and ASM".to_string(),
            thematic_areas: vec!["Magnetic measurements".to_string()],
            ..Product::default()
        },
        Product {
            product_id: "SW-EFIx_LP_1B".to_string(),
            name: "Plasma data".to_string(),
            ..Product::default()
        },
    ])
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response should be valid json")
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request(&catalog(), "GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    let payload = json(&response.body);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["products"], 2);
}

#[test]
fn index_serves_editor_page() {
    let response = route_request(&catalog(), "GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("Edit properties"));
}

#[test]
fn product_list_keeps_catalog_order() {
    let response = route_request(&catalog(), "GET", "/api/products", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(
        json(&response.body)["product_ids"],
        serde_json::json!(["SW-MAGx_LR_1B", "SW-EFIx_LP_1B"])
    );
}

#[test]
fn product_lookup_returns_record_or_404() {
    let catalog = catalog();
    let found = route_request(&catalog, "GET", "/api/products/SW-MAGx_LR_1B", "");
    assert_eq!(found.status_code, 200);
    let record = Product::from_json(&found.body).expect("record json should decode strictly");
    assert_eq!(record.name, "Magnetic field (1Hz) from VFM and ASM");

    let missing = route_request(&catalog, "GET", "/api/products/SW-NOPE", "");
    assert_eq!(missing.status_code, 404);
    assert_eq!(json(&missing.body)["status"], "error");
}

#[test]
fn new_product_is_all_defaults() {
    let response = route_request(&catalog(), "GET", "/api/new-product", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(Product::from_json(&response.body).unwrap(), Product::default());
}

#[test]
fn product_with_id_new_is_reachable() {
    let catalog = Catalog::from_products([Product {
        product_id: "new".to_string(),
        name: "Named new".to_string(),
        ..Product::default()
    }]);
    let response = route_request(&catalog, "GET", "/api/products/new", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(json(&response.body)["name"], "Named new");
}

#[test]
fn thematic_areas_and_fields_are_listed() {
    let areas = route_request(&catalog(), "GET", "/api/thematic-areas", "");
    assert_eq!(json(&areas.body)["thematic_areas"].as_array().map(Vec::len), Some(16));

    let fields = route_request(&catalog(), "GET", "/api/fields", "");
    let payload = json(&fields.body);
    let bindings = payload["fields"].as_array().expect("fields array");
    assert_eq!(bindings.len(), 12);
    assert_eq!(bindings[2]["name"], "thematic_areas");
    assert_eq!(bindings[2]["widget"], "multi_choice");
}

#[test]
fn import_rejects_unknown_fields_with_their_names() {
    let response = route_request(
        &catalog(),
        "POST",
        "/api/products/import",
        r#"{"product_id":"SW-X","variables":"a,b"}"#,
    );
    assert_eq!(response.status_code, 400);
    let payload = json(&response.body);
    assert_eq!(payload["unknown_fields"], serde_json::json!(["variables"]));
    assert!(payload["message"].as_str().unwrap().contains("mismatching product fields"));
}

#[test]
fn import_accepts_valid_upload() {
    let response = route_request(
        &catalog(),
        "POST",
        "/api/products/import",
        r#"{"product_id":"SW-X","name":"Uploaded"}"#,
    );
    assert_eq!(response.status_code, 200);
    assert_eq!(json(&response.body)["name"], "Uploaded");
}

#[test]
fn refresh_applies_form_and_recomputes_views() {
    let body = r#"{
        "product": {"product_id": "SW-X"},
        "fields": {
            "name": "Edited",
            "thematic_areas": ["Space Weather"],
            "link_vires_gui": "https://vires.services",
            "variables_table": "a,b\n1,2"
        }
    }"#;
    let response = route_request(&catalog(), "POST", "/api/products/refresh", body);
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body);
    assert_eq!(payload["product"]["product_id"], "SW-X");
    assert_eq!(payload["product"]["name"], "Edited");
    let markdown = payload["markdown"].as_str().unwrap();
    assert!(markdown.contains("Thematic areas: Space Weather"));
    assert!(markdown.contains("[VirES GUI](https://vires.services)"));
    assert!(payload["html"].as_str().unwrap().contains("<h1>SW-X</h1>"));
    assert!(payload["variables_table"].as_str().unwrap().starts_with("|   a |   b |"));
}

#[test]
fn refresh_rejects_disallowed_thematic_area() {
    let body = r#"{"fields": {"thematic_areas": ["Astrology"]}}"#;
    let response = route_request(&catalog(), "POST", "/api/products/refresh", body);
    assert_eq!(response.status_code, 400);
    assert!(json(&response.body)["message"]
        .as_str()
        .unwrap()
        .contains("Astrology"));
}

#[test]
fn refresh_rejects_invalid_body() {
    let response = route_request(&catalog(), "POST", "/api/products/refresh", "{bad json}");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("Invalid request body"));
}

#[test]
fn preview_reports_invalid_table_and_diagnostics() {
    let body = r#"{"product_id":"SW-X","variables_table":"a,b\n1,2,3"}"#;
    let response = route_request(&catalog(), "POST", "/api/products/preview", body);
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body);
    assert_eq!(payload["variables_table"], "INVALID TABLE");
    let diagnostics = payload["diagnostics"].as_array().unwrap();
    assert!(diagnostics
        .iter()
        .any(|diag| diag["context"] == "variables_table" && diag["severity"] == "warning"));
}

#[test]
fn export_returns_attachment_named_after_product_id() {
    let body = r#"{"product_id":"SW-MAGx_LR_1B","name":"Magnetic field"}"#;
    let response = route_request(&catalog(), "POST", "/api/products/export", body);
    assert_eq!(response.status_code, 200);
    assert_eq!(response.attachment.as_deref(), Some("SW-MAGx_LR_1B.json"));
    let exported = Product::from_json(&response.body).unwrap();
    assert_eq!(exported.name, "Magnetic field");
    assert!(response
        .to_http_string()
        .contains("Content-Disposition: attachment; filename=\"SW-MAGx_LR_1B.json\""));
}

#[test]
fn unknown_route_is_404() {
    let response = route_request(&catalog(), "DELETE", "/api/products/SW-X", "");
    assert_eq!(response.status_code, 404);
    assert!(response.body.contains("Route not found"));
}
