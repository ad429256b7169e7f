use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

use crate::gemini::GeminiClient;
use d3tr_core::commentary::{self, Commentary};
use d3tr_core::error::TrackerError;
use d3tr_core::gate::{self, GateDecision, RouteKind, Session};
use d3tr_core::models::{
    ChartSeries, Dashboard, FoodTemplate, Meal, MealType, MealsByCategory, NewFoodTemplate,
    NewMeal, NewWeightLog, Profile, SettingsUpdate, SetupRequest, UpdateFoodTemplate, UpdateMeal,
    UserId, WeightLog, WeightQuery,
};
use d3tr_core::service::TrackerService;

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

/// How requests are tied to a user.
#[derive(Clone)]
pub enum AuthMode {
    /// `Authorization: Bearer <token>` resolved against issued tokens.
    Tokens,
    /// Every request acts as this user (`--no-auth`).
    Local(UserId),
}

#[derive(Clone)]
struct AppState {
    svc: Arc<Mutex<TrackerService>>,
    auth: AuthMode,
    gemini: Option<Arc<GeminiClient>>,
}

impl AppState {
    fn service(&self) -> MutexGuard<'_, TrackerService> {
        self.svc
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// The user a request was admitted for.
#[derive(Clone)]
struct CurrentUser(UserId);

/// `None` admits any signed-in user regardless of setup state.
type Guard = Option<RouteKind>;

// --- Request / Response types ---

#[derive(Deserialize)]
struct CreateWeightRequest {
    date: Option<String>,
    weight_kg: f64,
}

#[derive(Deserialize)]
struct EditWeightRequest {
    weight_kg: f64,
}

#[derive(Deserialize)]
struct WeightHistoryQuery {
    limit: Option<u32>,
    start: Option<String>,
    end: Option<String>,
}

#[derive(Deserialize)]
struct CreateMealRequest {
    date: Option<String>,
    meal_type: String,
    food_name: String,
    calories: i64,
}

#[derive(Deserialize)]
struct UpdateMealRequest {
    date: Option<String>,
    meal_type: Option<String>,
    food_name: Option<String>,
    calories: Option<i64>,
}

#[derive(Deserialize)]
struct DateQuery {
    date: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    Unauthorized,
    BadRequest(String),
    Tracker(TrackerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid or missing API token".to_string(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Tracker(err) => match err {
                TrackerError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                TrackerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                TrackerError::SetupIncomplete => (StatusCode::FORBIDDEN, err.to_string()),
                TrackerError::SetupAlreadyComplete => (StatusCode::CONFLICT, err.to_string()),
                TrackerError::Storage(inner) => {
                    error!(error = %format!("{inner:#}"), "Internal server error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        Self::Tracker(err)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{s}'. Use YYYY-MM-DD")))
}

fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    s.map(parse_date).transpose()
}

fn parse_meal_type(s: &str) -> Result<MealType, ApiError> {
    s.parse::<MealType>()
        .map_err(|e| ApiError::Tracker(TrackerError::Validation(e)))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// --- Middleware ---

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the caller and runs the setup gate for `guard`.
fn admit(state: &AppState, headers: &HeaderMap, guard: Guard) -> Result<UserId, ApiError> {
    let svc = state.service();
    let user = match &state.auth {
        AuthMode::Local(user) => Some(user.clone()),
        AuthMode::Tokens => match bearer_token(headers) {
            Some(token) => svc.resolve_token(token)?,
            None => None,
        },
    };
    let session = svc.session_for(user.as_ref())?;

    let decision = match guard {
        Some(route) => gate::decide(session, route),
        None if session == Session::Anonymous => GateDecision::RequireLogin,
        None => GateDecision::Allow,
    };

    match (decision, user) {
        (GateDecision::Allow, Some(user)) => Ok(user),
        (GateDecision::Allow | GateDecision::RequireLogin, _) => Err(ApiError::Unauthorized),
        (GateDecision::RedirectToSetup, _) => Err(TrackerError::SetupIncomplete.into()),
        (GateDecision::RedirectToApp, _) => Err(TrackerError::SetupAlreadyComplete.into()),
    }
}

async fn require_gate(
    State((state, guard)): State<(AppState, Guard)>,
    mut request: Request,
    next: Next,
) -> Response {
    match admit(&state, request.headers(), guard) {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers: profile, setup & settings ---

async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state.service().get_profile(&user)?;
    Ok(Json(profile))
}

async fn complete_setup(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<SetupRequest>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let profile = state.service().complete_setup(&user, &req, today())?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_settings(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state.service().update_settings(&user, &update)?;
    Ok(Json(profile))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<DateQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let date = parse_optional_date(params.date.as_deref())?.unwrap_or_else(today);
    let dashboard = state.service().dashboard(&user, date)?;
    Ok(Json(dashboard))
}

// --- Handlers: weight ---

async fn create_weight(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateWeightRequest>,
) -> Result<(StatusCode, Json<WeightLog>), ApiError> {
    let date = parse_optional_date(req.date.as_deref())?.unwrap_or_else(today);
    let log = state.service().record_weight(
        &user,
        &NewWeightLog {
            date,
            weight_kg: req.weight_kg,
        },
    )?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn get_weight_history(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<WeightHistoryQuery>,
) -> Result<Json<Vec<WeightLog>>, ApiError> {
    let start = parse_optional_date(params.start.as_deref())?;
    let end = parse_optional_date(params.end.as_deref())?;
    let query = match (params.limit, start, end) {
        (Some(n), None, None) => WeightQuery::Recent(n),
        (None, None, None) => WeightQuery::All,
        (None, start, end) => WeightQuery::Range { start, end },
        (Some(_), _, _) => {
            return Err(ApiError::BadRequest(
                "Use either limit or start/end, not both".to_string(),
            ));
        }
    };
    let logs = state.service().list_weights(&user, query)?;
    Ok(Json(logs))
}

async fn edit_weight(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<EditWeightRequest>,
) -> Result<Json<WeightLog>, ApiError> {
    let log = state.service().edit_weight(&user, id, req.weight_kg)?;
    Ok(Json(log))
}

async fn delete_weight(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().delete_weight(&user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_weight_chart(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ChartSeries>, ApiError> {
    let chart = state.service().weight_chart(&user)?;
    Ok(Json(chart))
}

// --- Handlers: meals ---

async fn create_meal(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<Meal>), ApiError> {
    let meal = NewMeal {
        date: parse_optional_date(req.date.as_deref())?.unwrap_or_else(today),
        meal_type: parse_meal_type(&req.meal_type)?,
        food_name: req.food_name,
        calories: req.calories,
    };
    let meal = state.service().log_meal(&user, &meal)?;
    Ok((StatusCode::CREATED, Json(meal)))
}

async fn list_meals(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<DateQuery>,
) -> Result<Json<Vec<Meal>>, ApiError> {
    let date = parse_optional_date(params.date.as_deref())?;
    let meals = state.service().list_meals(&user, date)?;
    Ok(Json(meals))
}

async fn update_meal(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMealRequest>,
) -> Result<Json<Meal>, ApiError> {
    let update = UpdateMeal {
        date: parse_optional_date(req.date.as_deref())?,
        meal_type: req.meal_type.as_deref().map(parse_meal_type).transpose()?,
        food_name: req.food_name,
        calories: req.calories,
    };
    let meal = state.service().update_meal(&user, id, &update)?;
    Ok(Json(meal))
}

async fn delete_meal(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().delete_meal(&user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_meal_summary(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(date_str): Path<String>,
) -> Result<Json<MealsByCategory>, ApiError> {
    let date = parse_date(&date_str)?;
    let summary = state.service().meals_by_category(&user, date)?;
    Ok(Json(summary))
}

async fn save_meal_as_template(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<FoodTemplate>), ApiError> {
    let template = state.service().template_from_meal(&user, id)?;
    Ok((StatusCode::CREATED, Json(template)))
}

// --- Handlers: food templates ---

async fn list_foods(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<FoodTemplate>>, ApiError> {
    let templates = state.service().list_templates(&user)?;
    Ok(Json(templates))
}

async fn create_food(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<NewFoodTemplate>,
) -> Result<(StatusCode, Json<FoodTemplate>), ApiError> {
    let template = state.service().create_template(&user, &req)?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn update_food(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFoodTemplate>,
) -> Result<Json<FoodTemplate>, ApiError> {
    let template = state.service().update_template(&user, id, &req)?;
    Ok(Json(template))
}

async fn delete_food(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service().delete_template(&user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Handlers: coaching ---

async fn get_feedback(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Commentary>, ApiError> {
    // The lock must not be held across the Gemini round trip.
    let summary = state.service().feedback_summary(&user)?;

    let Some(client) = state.gemini.as_ref() else {
        return Ok(Json(Commentary::unconfigured()));
    };
    let prompt = commentary::build_prompt(&summary);
    Ok(Json(Commentary::from_result(client.generate(&prompt).await)))
}

fn guarded(state: &AppState, guard: Guard, routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        (state.clone(), guard),
        require_gate,
    ))
}

fn build_router(state: AppState) -> Router {
    let any_user = Router::new().route("/api/profile", get(get_profile));

    let setup = Router::new().route("/api/setup", post(complete_setup));

    let app = Router::new()
        .route("/api/settings", put(update_settings))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/weight", post(create_weight).get(get_weight_history))
        .route("/api/weight/chart", get(get_weight_chart))
        .route("/api/weight/{id}", put(edit_weight).delete(delete_weight))
        .route("/api/meals", post(create_meal).get(list_meals))
        .route("/api/meals/summary/{date}", get(get_meal_summary))
        .route("/api/meals/{id}", put(update_meal).delete(delete_meal))
        .route("/api/meals/{id}/template", post(save_meal_as_template))
        .route("/api/foods", post(create_food).get(list_foods))
        .route("/api/foods/{id}", put(update_food).delete(delete_food))
        .route("/api/feedback", get(get_feedback));

    Router::new()
        .merge(guarded(&state, None, any_user))
        .merge(guarded(&state, Some(RouteKind::Setup), setup))
        .merge(guarded(&state, Some(RouteKind::App), app))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

pub async fn start_server(
    svc: TrackerService,
    port: u16,
    bind: &str,
    auth: AuthMode,
    gemini: Option<GeminiClient>,
) -> anyhow::Result<()> {
    if matches!(auth, AuthMode::Local(_)) {
        warn!("Authentication disabled (--no-auth). Every request acts as the local user.");
        if bind != "127.0.0.1" && bind != "localhost" {
            warn!(
                bind,
                "Listening with no authentication. Any device on your network can access this API."
            );
        }
    }
    if gemini.is_none() {
        info!("GEMINI_API_KEY not set, coaching feedback disabled");
    }

    let state = AppState {
        svc: Arc::new(Mutex::new(svc)),
        auth,
        gemini: gemini.map(Arc::new),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    info!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
