use axum::{
    Router,
    extract::Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Assumptions, ComponentInput, Recommendation, YearRow, recommend, simulate_plan,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComponentPayload {
    name: String,
    quantity: Option<i64>,
    useful_life_years: Option<i64>,
    cycle_years: Option<i64>,
    remaining_life_years: Option<i64>,
    current_replacement_cost: Option<f64>,
}

// Shared by the recommend and simulate endpoints; omitted scalars fall
// back to the study-form defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StudyPayload {
    start_year: Option<i32>,
    horizon_years: Option<u32>,
    inflation_rate: Option<f64>,
    interest_rate: Option<f64>,
    starting_balance: Option<f64>,
    min_balance: Option<f64>,
    annual_contribution: Option<f64>,
    components: Vec<ComponentPayload>,
}

#[derive(Parser, Debug)]
#[command(
    name = "reservesim",
    about = "Reserve study funding projection and levelized contribution solver"
)]
struct Cli {
    #[arg(long, default_value_t = 2025, help = "First fiscal year of the projection")]
    start_year: i32,
    #[arg(long, default_value_t = 30, help = "Number of years to project")]
    horizon_years: u32,
    #[arg(
        long,
        default_value_t = 0.03,
        help = "Annual inflation applied to replacement costs, as a fraction (e.g. 0.03)"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 0.01,
        help = "Annual interest earned on the year-start balance, as a fraction"
    )]
    interest_rate: f64,
    #[arg(long, default_value_t = 50_000.0, help = "Reserve fund balance at the start year")]
    starting_balance: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Balance floor the fund must never drop below"
    )]
    min_balance: f64,
    #[arg(
        long,
        default_value_t = 25_000.0,
        help = "Fixed annual contribution used by the simulate endpoint"
    )]
    annual_contribution: f64,
}

#[derive(Debug)]
struct ApiRequest {
    assumptions: Assumptions,
    components: Vec<ComponentInput>,
    annual_contribution: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendResponse {
    annual_contribution: f64,
    converged: bool,
    years: Vec<YearRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    annual_contribution: f64,
    funded: bool,
    years: Vec<YearRow>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_assumptions(cli: &Cli) -> Result<Assumptions, String> {
    if cli.horizon_years < 1 {
        return Err("--horizon-years must be >= 1".to_string());
    }

    if !cli.inflation_rate.is_finite() || cli.inflation_rate <= -1.0 {
        return Err("--inflation-rate must be a finite fraction > -1".to_string());
    }

    if !cli.interest_rate.is_finite() {
        return Err("--interest-rate must be a finite fraction".to_string());
    }

    if !cli.starting_balance.is_finite() {
        return Err("--starting-balance must be a finite amount".to_string());
    }

    if !cli.min_balance.is_finite() || cli.min_balance < 0.0 {
        return Err("--min-balance must be >= 0".to_string());
    }

    if !cli.annual_contribution.is_finite() || cli.annual_contribution < 0.0 {
        return Err("--annual-contribution must be >= 0".to_string());
    }

    Ok(Assumptions {
        start_year: cli.start_year,
        horizon_years: cli.horizon_years,
        inflation_rate: cli.inflation_rate,
        interest_rate: cli.interest_rate,
        starting_balance: cli.starting_balance,
        min_balance: cli.min_balance,
    })
}

fn component_from_payload(index: usize, payload: ComponentPayload) -> Result<ComponentInput, String> {
    let Some(useful_life_years) = payload.useful_life_years else {
        return Err(format!("component {index}: usefulLifeYears is required"));
    };
    let Some(remaining_life_years) = payload.remaining_life_years else {
        return Err(format!("component {index}: remainingLifeYears is required"));
    };
    let Some(current_replacement_cost) = payload.current_replacement_cost else {
        return Err(format!("component {index}: currentReplacementCost is required"));
    };

    Ok(ComponentInput {
        name: payload.name,
        quantity: payload.quantity,
        useful_life_years,
        cycle_years: payload.cycle_years,
        remaining_life_years,
        current_replacement_cost,
    })
}

fn api_request_from_payload(payload: StudyPayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.start_year {
        cli.start_year = v;
    }
    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.starting_balance {
        cli.starting_balance = v;
    }
    if let Some(v) = payload.min_balance {
        cli.min_balance = v;
    }
    if let Some(v) = payload.annual_contribution {
        cli.annual_contribution = v;
    }

    let assumptions = build_assumptions(&cli)?;
    let components = payload
        .components
        .into_iter()
        .enumerate()
        .map(|(index, component)| component_from_payload(index, component))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiRequest {
        assumptions,
        components,
        annual_contribution: cli.annual_contribution,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        start_year: 2025,
        horizon_years: 30,
        inflation_rate: 0.03,
        interest_rate: 0.01,
        starting_balance: 50_000.0,
        min_balance: 0.0,
        annual_contribution: 25_000.0,
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/recommend", post(recommend_handler))
        .route("/api/simulate", post(simulate_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Reserve study HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn recommend_handler(Json(payload): Json<StudyPayload>) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match recommend(&request.assumptions, &request.components) {
        Ok(recommendation) => {
            json_response(StatusCode::OK, recommend_response(recommendation))
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn simulate_handler(Json(payload): Json<StudyPayload>) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match simulate_plan(
        &request.assumptions,
        &request.components,
        request.annual_contribution,
    ) {
        Ok(run) => json_response(
            StatusCode::OK,
            SimulateResponse {
                annual_contribution: request.annual_contribution,
                funded: run.funded,
                years: run.years,
            },
        ),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

fn recommend_response(recommendation: Recommendation) -> RecommendResponse {
    RecommendResponse {
        annual_contribution: recommendation.annual_contribution,
        converged: recommendation.converged,
        years: recommendation.years,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<StudyPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}
