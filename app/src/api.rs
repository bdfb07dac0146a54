use actix_web::{web, HttpResponse, Result as ActixResult};
use anyhow::Context;
use chrono::Local;
use serde_json::Value;

use crate::error::LookupError;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::lookup::CompanyLookup;
use crate::ui;

pub const WRONG_PARAMETER: &str = "Wrong parameter";
const CODE_LENGTH: usize = 9;

pub fn is_valid_code(code: &str) -> bool {
    code.chars().count() == CODE_LENGTH
}

/// Returns the code when it is a string of exactly nine characters.
pub fn validate_code(code: Option<&Value>) -> Option<&str> {
    code.and_then(Value::as_str).filter(|code| is_valid_code(code))
}

/// `code` of a JSON object payload; arrays, strings and other scalars have none.
fn payload_code(payload: &Value) -> Option<&Value> {
    payload.as_object().and_then(|fields| fields.get("code"))
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

/// `POST /getdata/` with `{"code": "304232351"}`.
///
/// The body is read as JSON whatever its content type.
pub async fn get_data<F: Fetcher + 'static>(
    body: web::Bytes,
    state: web::Data<CompanyLookup<F>>,
) -> ActixResult<HttpResponse> {
    // Anything that is not JSON at all is reported with the parser's message
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            ui::print_warning(&format!("Unreadable request body: {}", e));
            return Ok(bad_request(&e.to_string()));
        }
    };

    // Validated before any request goes out to the directory
    let Some(code) = validate_code(payload_code(&payload)) else {
        return Ok(bad_request(WRONG_PARAMETER));
    };

    match state.lookup(code).await {
        Ok(record) => match record.to_json() {
            Ok(json) => Ok(HttpResponse::Ok()
                .content_type("application/json")
                .body(json)),
            Err(e) => {
                ui::print_warning(&format!("Could not serialize company {}: {}", code, e));
                Ok(bad_request(&e.to_string()))
            }
        },
        Err(e) => {
            // Unknown codes are routine; everything else deserves a warning
            match &e {
                LookupError::NotFound { .. } => ui::print_verbose(&e.to_string()),
                _ => ui::print_warning(&format!("Lookup of {} failed: {}", code, e)),
            }
            Ok(bad_request(&e.to_string()))
        }
    }
}

async fn health_check<F: Fetcher + 'static>(
    state: web::Data<CompanyLookup<F>>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "directory": state.config().base_url,
    })))
}

/// Registers the lookup routes for a service backed by `F`.
pub fn configure<F: Fetcher + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/getdata/", web::post().to(get_data::<F>))
        .route("/health", web::get().to(health_check::<F>));
}

pub async fn start_server(
    lookup: CompanyLookup<HttpFetcher>,
    host: &str,
    port: u16,
    workers: usize,
) -> anyhow::Result<()> {
    // One lookup service for every worker; it is dropped when the server stops
    let state = web::Data::new(lookup);
    let address = format!("{}:{}", host, port);

    ui::print_header("🌐 Company lookup API");
    ui::print_success(&format!("Server starting on http://{}", address));
    ui::print_info(&format!("Started at: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
    ui::print_info(&format!("Directory: {}", state.config().base_url));
    ui::print_info("Available endpoints:");
    ui::print_endpoint("POST", "/getdata/", "Look up a company by its 9-digit code");
    ui::print_endpoint("GET", "/health", "Server status");
    ui::print_verbose(&format!(
        "Example: curl -X POST -d '{{\"code\": \"304232351\"}}' http://{}/getdata/",
        address
    ));
    ui::print_separator();

    // Default of one worker: lookups are served one after another
    actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .app_data(state.clone())
            .configure(configure::<HttpFetcher>)
    })
    .bind(&address)
    .with_context(|| format!("Failed to bind {}", address))?
    .workers(workers)
    .run()
    .await?;

    ui::print_info("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;
    use crate::lookup::fixtures::{empty_directory, known_company};
    use actix_web::{http::StatusCode, test as actix_test, App};

    async fn post(lookup: CompanyLookup<StubFetcher>, body: &str) -> (StatusCode, String, usize) {
        let state = web::Data::new(lookup);
        let app = actix_test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure::<StubFetcher>),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/getdata/")
            .set_payload(body.to_string())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let status = resp.status();
        let bytes = actix_test::read_body(resp).await;
        let text = String::from_utf8(bytes.to_vec()).expect("UTF-8 response");
        (status, text, state.fetcher().call_count())
    }

    fn json(text: &str) -> Value {
        serde_json::from_str(text).expect("JSON response")
    }

    #[actix_web::test]
    async fn known_code_returns_sorted_record() {
        let (status, text, calls) = post(known_company(), r#"{"code": "304232351"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let body = json(&text);
        assert_eq!(body["code"], "304232351");
        assert_eq!(body["name"], "UAB \"Pavyzdinė įmonė\"");
        let positions: Vec<usize> = body
            .as_object()
            .unwrap()
            .keys()
            .map(|key| text.find(&format!("\"{}\":", key)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(calls, 3);
    }

    #[actix_web::test]
    async fn unknown_code_is_not_found() {
        let (status, text, _) = post(empty_directory(), r#"{"code": "123456789"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = json(&text);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("123456789"));
        assert!(message.contains("was not found"));
    }

    #[actix_web::test]
    async fn missing_code_is_rejected_without_network() {
        let (status, text, calls) = post(known_company(), r#"{"kodas": "304232351"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&text)["error"], WRONG_PARAMETER);
        assert_eq!(calls, 0);
    }

    #[actix_web::test]
    async fn wrong_length_codes_are_rejected_without_network() {
        for payload in [
            r#"{"code": "30423235"}"#,
            r#"{"code": "3042323511"}"#,
            r#"{"code": ""}"#,
            r#"{"code": 304232351}"#,
            r#"{"code": null}"#,
            r#"["304232351"]"#,
            r#""304232351""#,
            r#""abc""#,
        ] {
            let (status, text, calls) = post(known_company(), payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
            assert_eq!(json(&text)["error"], WRONG_PARAMETER);
            assert_eq!(calls, 0);
        }
    }

    #[actix_web::test]
    async fn malformed_json_is_a_client_error() {
        let (status, text, calls) = post(known_company(), "code=304232351").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&text)["error"].is_string());
        assert_eq!(calls, 0);
    }

    #[actix_web::test]
    async fn health_reports_directory() {
        let state = web::Data::new(known_company());
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .configure(configure::<StubFetcher>),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["directory"], "https://rekvizitai.vz.lt");
    }

    #[test]
    fn validate_code_counts_characters() {
        let lithuanian = Value::from("ąčęėįšųūž");
        assert_eq!(validate_code(Some(&lithuanian)), Some("ąčęėįšųūž"));
        assert_eq!(validate_code(None), None);
        assert_eq!(validate_code(Some(&Value::from(304232351))), None);
    }
}
