// 🌐 Web server - HTML pages and JSON API over a `Ledger`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::bank::Bank;
use crate::dates::{format_date, parse_date, DateRange};
use crate::entry::Entry;
use crate::error::LedgerError;
use crate::form::EntryForm;
use crate::ledger::{filter_history, Ledger, OverviewQuery};
use crate::pages::{render_index, render_users};
use crate::summary::{BankTotals, Summary};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

fn status_for(err: &LedgerError) -> StatusCode {
    if err.is_user_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn api_error(err: LedgerError) -> Response {
    if !err.is_user_error() {
        error!("API request failed: {err}");
    }
    (status_for(&err), Json(ApiResponse::<()>::err(err.to_string()))).into_response()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ============================================================================
// Page Handlers
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    selected_bank: Option<String>,
    person: Option<String>,
    selected_user_summary: Option<String>,
    user: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl From<IndexParams> for OverviewQuery {
    fn from(params: IndexParams) -> Self {
        OverviewQuery {
            selected_bank: params.selected_bank,
            person: params.person,
            summary_user: params.selected_user_summary.or(params.user),
            start_date: params.start_date,
            end_date: params.end_date,
        }
    }
}

/// GET / - Form, summary and history
async fn index(State(state): State<AppState>, Query(params): Query<IndexParams>) -> Html<String> {
    let view = state.ledger.overview(&params.into(), today());
    Html(render_index(&view))
}

/// POST / - Submit a new entry
async fn submit_entry(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
    Form(form): Form<EntryForm>,
) -> Response {
    match state.ledger.submit(&form) {
        Ok(entry) => {
            let person = entry.person.as_deref().unwrap_or("");
            Redirect::to(&format!("/?person={}", urlencoding::encode(person))).into_response()
        }
        Err(err) => {
            if !err.is_user_error() {
                error!("Error saving entry: {err}");
            }

            let mut query: OverviewQuery = params.into();
            if form.person.is_some() {
                query.person = form.person.clone();
            }
            let mut view = state.ledger.overview(&query, today());
            // Keep any date range complaint from the query string alongside the submit error
            view.error = Some(match view.error.take() {
                Some(range_err) => format!("{err}；{range_err}"),
                None => err.to_string(),
            });

            (status_for(&err), Html(render_index(&view))).into_response()
        }
    }
}

/// POST /delete/:index - Remove by position
async fn delete_entry(State(state): State<AppState>, Path(index): Path<usize>) -> Response {
    match state.ledger.delete_at(index) {
        Ok(true) => Redirect::to("/").into_response(),
        Ok(false) => {
            warn!(index, "delete ignored, index out of range");
            Redirect::to("/").into_response()
        }
        Err(err) => delete_failed(&state, err),
    }
}

/// POST /delete_id/:id - Remove by stable id
async fn delete_entry_by_id(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.ledger.delete_by_id(&id) {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => delete_failed(&state, err),
    }
}

fn delete_failed(state: &AppState, err: LedgerError) -> Response {
    error!("Error deleting entry: {err}");
    let mut view = state.ledger.overview(&OverviewQuery::default(), today());
    view.error = Some(err.to_string());
    (status_for(&err), Html(render_index(&view))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ManageUsersForm {
    action: Option<String>,
    new_user: Option<String>,
    user_to_delete: Option<String>,
}

/// GET /manage_users - Registry listing
async fn list_users(State(state): State<AppState>) -> Html<String> {
    let registry = state.ledger.registry();
    Html(render_users(registry.names(), None))
}

/// POST /manage_users - Add or remove a registry member
async fn manage_users(State(state): State<AppState>, Form(form): Form<ManageUsersForm>) -> Response {
    let result = match form.action.as_deref() {
        Some("add") => state.ledger.add_user(form.new_user.as_deref().unwrap_or("")),
        Some("delete") => match form.user_to_delete.as_deref() {
            Some(name) if !name.trim().is_empty() => state.ledger.remove_user(name),
            _ => Err(LedgerError::MissingField("user_to_delete")),
        },
        _ => Err(LedgerError::MissingField("action")),
    };

    match result {
        Ok(()) => Redirect::to("/manage_users").into_response(),
        Err(err) => {
            if !err.is_user_error() {
                error!("Error updating users: {err}");
            }
            let registry = state.ledger.registry();
            let page = render_users(registry.names(), Some(&err.to_string()));
            (status_for(&err), Html(page)).into_response()
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    user: Option<String>,
    selected_user_summary: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Serialize)]
struct SummaryResponse {
    user: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    summary: Summary,
    total: BankTotals,
}

/// Both bounds or neither; a lone bound is ignored
fn api_range(start: Option<&str>, end: Option<&str>) -> Result<Option<DateRange>, LedgerError> {
    let start = start.filter(|s| !s.trim().is_empty());
    let end = end.filter(|s| !s.trim().is_empty());

    match (start, end) {
        (Some(start), Some(end)) => {
            let (start, end) = (parse_date(start)?, parse_date(end)?);
            if start > end {
                return Err(LedgerError::DateRange);
            }
            Ok(Some(DateRange::new(start, end)))
        }
        _ => Ok(None),
    }
}

/// GET /api/summary - Per-bank totals for one person (or everyone)
async fn api_summary(State(state): State<AppState>, Query(params): Query<SummaryParams>) -> Response {
    let range = match api_range(params.start_date.as_deref(), params.end_date.as_deref()) {
        Ok(range) => range,
        Err(err) => return api_error(err),
    };

    let user = params
        .user
        .or(params.selected_user_summary)
        .filter(|u| !u.trim().is_empty());
    let summary = state.ledger.summary(user.as_deref(), range);

    let response = SummaryResponse {
        user,
        start_date: range.map(|r| format_date(r.start)),
        end_date: range.map(|r| format_date(r.end)),
        total: summary.grand_total(),
        summary,
    };

    Json(ApiResponse::ok(response)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    selected_bank: Option<String>,
    person: Option<String>,
}

#[derive(Serialize)]
struct HistoryItem {
    index: usize,
    #[serde(flatten)]
    entry: Entry,
}

/// GET /api/history - Entries, optionally filtered by bank and person
async fn api_history(State(state): State<AppState>, Query(params): Query<HistoryParams>) -> impl IntoResponse {
    let entries = state.ledger.entries();
    let bank = params.selected_bank.as_deref().filter(|b| !b.is_empty());
    let person = params.person.as_deref().filter(|p| !p.is_empty());

    let items: Vec<HistoryItem> = filter_history(&entries, bank, person)
        .into_iter()
        .map(|(index, entry)| HistoryItem {
            index,
            entry: entry.clone(),
        })
        .collect();

    Json(ApiResponse::ok(items))
}

#[derive(Debug, Deserialize)]
pub struct AvailableParams {
    person: Option<String>,
}

/// GET /api/available_banks - Banks a person can still submit
async fn api_available_banks(State(state): State<AppState>, Query(params): Query<AvailableParams>) -> Response {
    match params.person.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(person) => {
            let banks: Vec<Bank> = state.ledger.available_banks(person);
            Json(ApiResponse::ok(banks)).into_response()
        }
        None => api_error(LedgerError::MissingField("person")),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(ledger: Ledger) -> Router {
    let state = AppState { ledger };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/summary", get(api_summary))
        .route("/history", get(api_history))
        .route("/available_banks", get(api_available_banks))
        .with_state(state.clone());

    Router::new()
        .route("/", get(index).post(submit_entry))
        .route("/manage_users", get(list_users).post(manage_users))
        .route("/delete/:index", post(delete_entry))
        .route("/delete_id/:id", post(delete_entry_by_id))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LedgerStore, MemoryStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn entry(d: &str, person: &str, bank: Bank, values: [i64; 3]) -> Entry {
        Entry::new(parse_date(d).unwrap(), Some(person.to_string()), bank, values)
    }

    fn app(entries: Vec<Entry>) -> (Arc<MemoryStore>, Router) {
        let store = Arc::new(MemoryStore::with_entries(entries));
        let router = router(Ledger::new(store.clone()));
        (store, router)
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn submission<'a>(person: &'a str, bank: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("person", person),
            ("date", "2025-04-01"),
            ("bank", bank),
            ("value1", "10"),
            ("value2", "20"),
            ("value3", "50"),
        ]
    }

    #[tokio::test]
    async fn test_index_renders() {
        let (_, app) = app(vec![entry("2025-03-31", "牙珍", Bank::Mpay, [10, 10, 10])]);

        let response = app.oneshot(get_req("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("抽獎記錄"));
        assert!(html.contains("/delete/0"));
        assert!(html.contains("國際銀行"));
    }

    #[tokio::test]
    async fn test_submit_redirects_and_stores() {
        let (store, app) = app(vec![]);

        let response = app.oneshot(post_form("/", &submission("牙珍", "Mpay"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert_eq!(location, format!("/?person={}", urlencoding::encode("牙珍")));

        let stored = store.load_entries().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].total_value(), 80);
    }

    #[tokio::test]
    async fn test_submit_reused_bank_shows_error() {
        let (store, app) = app(vec![entry("2025-03-31", "牙珍", Bank::Mpay, [10, 10, 10])]);

        let response = app.oneshot(post_form("/", &submission("牙珍", "Mpay"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_string(response).await;
        assert!(html.contains("牙珍 已使用過 Mpay"));
        assert_eq!(store.load_entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_error_keeps_range_error() {
        let (_, app) = app(vec![entry("2025-03-31", "牙珍", Bank::Mpay, [10, 10, 10])]);

        let uri = "/?start_date=2025-04-04&end_date=2025-03-31";
        let response = app.oneshot(post_form(uri, &submission("牙珍", "Mpay"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_string(response).await;
        assert!(html.contains("牙珍 已使用過 Mpay"));
        assert!(html.contains("開始日期不能晚於結束日期"));
    }

    #[tokio::test]
    async fn test_submit_missing_field() {
        let (_, app) = app(vec![]);
        let mut fields = submission("牙珍", "Mpay");
        fields.retain(|(k, _)| *k != "value3");

        let response = app.oneshot(post_form("/", &fields)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("缺少欄位 value3"));
    }

    #[tokio::test]
    async fn test_submit_storage_failure_is_reported() {
        let (store, app) = app(vec![]);
        store.fail_writes(true);

        let response = app.oneshot(post_form("/", &submission("牙珍", "Mpay"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("儲存失敗"));
    }

    #[tokio::test]
    async fn test_delete_by_index() {
        let entries = vec![
            entry("2025-03-31", "牙珍", Bank::Mpay, [10, 10, 10]),
            entry("2025-04-01", "牙珍", Bank::Uepay, [20, 20, 20]),
        ];
        let (store, app) = app(entries.clone());

        let response = app.clone().oneshot(post_form("/delete/0", &[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(store.load_entries().unwrap(), vec![entries[1].clone()]);

        let response = app.oneshot(post_form("/delete/5", &[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(store.load_entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let entries = vec![entry("2025-03-31", "牙珍", Bank::Mpay, [10, 10, 10])];
        let (store, app) = app(entries.clone());

        let uri = format!("/delete_id/{}", entries[0].id);
        let response = app.oneshot(post_form(&uri, &[])).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(store.load_entries().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manage_users() {
        let (store, app) = app(vec![]);

        let response = app
            .clone()
            .oneshot(post_form("/manage_users", &[("action", "add"), ("new_user", "阿May")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .clone()
            .oneshot(post_form("/manage_users", &[("action", "delete"), ("user_to_delete", "志強")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            store.load_users().unwrap(),
            Some(vec!["牙珍".to_string(), "阿May".to_string()])
        );

        let response = app
            .clone()
            .oneshot(post_form("/manage_users", &[("action", "add"), ("new_user", "牙珍")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("用戶已存在"));

        let html = body_string(app.oneshot(get_req("/manage_users")).await.unwrap()).await;
        assert!(html.contains("阿May"));
    }

    #[tokio::test]
    async fn test_api_summary_scenario() {
        let (_, app) = app(vec![entry("2025-03-31", "牙珍", Bank::BankOfChina, [10, 10, 10])]);
        let uri = format!(
            "/api/summary?user={}&start_date=2025-03-31&end_date=2025-04-04",
            urlencoding::encode("牙珍")
        );

        let response = app.oneshot(get_req(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let summary = &json["data"]["summary"];
        assert_eq!(summary["中國銀行"]["count"], 3);
        assert_eq!(summary["中國銀行"]["total_value"], 30);
        assert_eq!(summary["Mpay"]["count"], 0);
        assert_eq!(summary.as_object().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_api_summary_reversed_range() {
        let (_, app) = app(vec![]);

        let response = app
            .oneshot(get_req("/api/summary?start_date=2025-04-04&end_date=2025-03-31"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "開始日期不能晚於結束日期");
    }

    #[tokio::test]
    async fn test_api_history_filters_by_bank() {
        let (_, app) = app(vec![
            entry("2025-03-31", "牙珍", Bank::Mpay, [10, 10, 10]),
            entry("2025-04-01", "牙珍", Bank::Uepay, [20, 20, 20]),
        ]);

        let response = app.oneshot(get_req("/api/history?selected_bank=UEPAY")).await.unwrap();
        let json = body_json(response).await;

        let items = json["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["index"], 1);
        assert_eq!(items[0]["entries"][0]["bank"], "UEPAY");
    }

    #[tokio::test]
    async fn test_api_available_banks() {
        let (_, app) = app(vec![entry("2025-03-31", "牙珍", Bank::BankOfChina, [10, 10, 10])]);

        let uri = format!("/api/available_banks?person={}", urlencoding::encode("牙珍"));
        let json = body_json(app.clone().oneshot(get_req(&uri)).await.unwrap()).await;
        let banks = json["data"].as_array().unwrap();
        assert_eq!(banks.len(), 7);
        assert_eq!(banks[0], "大豐銀行");

        let response = app.oneshot(get_req("/api/available_banks")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let (_, app) = app(vec![]);
        let json = body_json(app.oneshot(get_req("/api/health")).await.unwrap()).await;
        assert_eq!(json["data"], "OK");
    }
}
