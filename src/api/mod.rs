use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    GoalProjection, Inputs, SummaryMetrics, YearlySnapshot, derive_metrics, goal_projection,
    project,
};

const MAX_DURATION_YEARS: u32 = 200;

// Form fields arrive either as JSON numbers or as raw text from input
// elements; both normalize to a finite f64 here, at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            FormValue::Number(value) => value.is_finite().then_some(*value),
            FormValue::Text(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    initial_investment: Option<FormValue>,
    monthly_investment: Option<FormValue>,
    expected_return: Option<FormValue>,
    duration: Option<FormValue>,
    target_amount: Option<FormValue>,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg-calc",
    about = "One-shot compound-growth projection, printed as JSON"
)]
struct Cli {
    #[arg(long, help = "Starting lump sum")]
    initial_investment: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Contribution added at the end of every month"
    )]
    monthly_investment: f64,
    #[arg(long, help = "Expected nominal annual return in percent, e.g. 8")]
    expected_return: f64,
    #[arg(long, help = "Investment horizon in whole years")]
    duration: u32,
    #[arg(long, help = "Optional balance target for the goal estimate")]
    target_amount: Option<f64>,
}

#[derive(Debug)]
struct ApiRequest {
    // None means the form is incomplete; the response is the neutral
    // document, not an error.
    inputs: Option<Inputs>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    snapshots: Vec<YearlySnapshot>,
    summary: SummaryMetrics,
    goal: Option<GoalProjection>,
}

impl CalculateResponse {
    fn incomplete() -> Self {
        Self {
            snapshots: Vec::new(),
            summary: SummaryMetrics::neutral(),
            goal: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<Inputs, String> {
    if !cli.initial_investment.is_finite() || cli.initial_investment < 0.0 {
        return Err("--initial-investment must be >= 0".to_string());
    }

    if !cli.monthly_investment.is_finite() || cli.monthly_investment < 0.0 {
        return Err("--monthly-investment must be >= 0".to_string());
    }

    if !cli.expected_return.is_finite() || cli.expected_return <= -100.0 {
        return Err("--expected-return must be > -100".to_string());
    }

    if cli.duration > MAX_DURATION_YEARS {
        return Err(format!("--duration must be <= {MAX_DURATION_YEARS}"));
    }

    let target_amount = match cli.target_amount {
        Some(target) if !target.is_finite() => {
            return Err("--target-amount must be finite".to_string());
        }
        // A zero or negative target clears the goal rather than erroring;
        // the form treats it as "no goal set".
        Some(target) if target <= 0.0 => None,
        other => other,
    };

    Ok(Inputs {
        initial_investment: cli.initial_investment,
        monthly_investment: cli.monthly_investment,
        expected_return: cli.expected_return,
        duration: cli.duration,
        target_amount,
    })
}

fn api_request_from_payload(payload: CalculatePayload) -> Result<ApiRequest, String> {
    let initial_investment = payload.initial_investment.as_ref().and_then(FormValue::as_number);
    let monthly_investment = payload.monthly_investment.as_ref().and_then(FormValue::as_number);
    let expected_return = payload.expected_return.as_ref().and_then(FormValue::as_number);
    let duration = payload.duration.as_ref().and_then(FormValue::as_number);

    let (Some(initial_investment), Some(monthly_investment), Some(expected_return), Some(duration)) =
        (initial_investment, monthly_investment, expected_return, duration)
    else {
        return Ok(ApiRequest { inputs: None });
    };

    let cli = Cli {
        initial_investment,
        monthly_investment,
        expected_return,
        // Whole years; fractional input truncates, negatives land on zero and
        // produce the empty projection.
        duration: duration as u32,
        target_amount: payload.target_amount.as_ref().and_then(FormValue::as_number),
    };

    build_inputs(cli).map(|inputs| ApiRequest {
        inputs: Some(inputs),
    })
}

fn build_calculate_response(inputs: &Inputs) -> CalculateResponse {
    let snapshots = project(inputs);
    let summary = derive_metrics(inputs, &snapshots);
    let goal = goal_projection(inputs, &snapshots);
    CalculateResponse {
        snapshots,
        summary,
        goal,
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Investment projection API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/calculate");

    axum::serve(listener, app).await
}

pub fn run_calc<I>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = String>,
{
    let argv = std::iter::once("nestegg-calc".to_string()).chain(args);
    let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
    let inputs = build_inputs(cli)?;
    let response = build_calculate_response(&inputs);
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to serialize result: {e}"))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let response = match &request.inputs {
        Some(inputs) => build_calculate_response(inputs),
        None => CalculateResponse::incomplete(),
    };
    json_response(StatusCode::OK, response)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
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
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        Cli {
            initial_investment: 10_000.0,
            monthly_investment: 500.0,
            expected_return: 8.0,
            duration: 10,
            target_amount: None,
        }
    }

    #[test]
    fn api_request_from_json_parses_numeric_fields() {
        let json = r#"{
          "initialInvestment": 10000,
          "monthlyInvestment": 500,
          "expectedReturn": 8,
          "duration": 10,
          "targetAmount": 150000
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let inputs = request.inputs.expect("form is complete");

        assert_approx(inputs.initial_investment, 10_000.0);
        assert_approx(inputs.monthly_investment, 500.0);
        assert_approx(inputs.expected_return, 8.0);
        assert_eq!(inputs.duration, 10);
        assert_approx(inputs.target_amount.expect("target set"), 150_000.0);
    }

    #[test]
    fn api_request_from_json_parses_text_form_fields() {
        let json = r#"{
          "initialInvestment": "10000",
          "monthlyInvestment": " 500 ",
          "expectedReturn": "8",
          "duration": "10"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let inputs = request.inputs.expect("form is complete");

        assert_approx(inputs.initial_investment, 10_000.0);
        assert_approx(inputs.monthly_investment, 500.0);
        assert_eq!(inputs.duration, 10);
        assert_eq!(inputs.target_amount, None);
    }

    #[test]
    fn missing_field_marks_request_incomplete() {
        let json = r#"{
          "initialInvestment": 10000,
          "expectedReturn": 8,
          "duration": 10
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert!(request.inputs.is_none());
    }

    #[test]
    fn blank_field_marks_request_incomplete() {
        let json = r#"{
          "initialInvestment": "",
          "monthlyInvestment": 500,
          "expectedReturn": 8,
          "duration": 10
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert!(request.inputs.is_none());
    }

    #[test]
    fn unparsable_field_marks_request_incomplete() {
        let json = r#"{
          "initialInvestment": "lots",
          "monthlyInvestment": 500,
          "expectedReturn": 8,
          "duration": 10
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert!(request.inputs.is_none());
    }

    #[test]
    fn fractional_duration_truncates_to_whole_years() {
        let json = r#"{
          "initialInvestment": 1000,
          "monthlyInvestment": 100,
          "expectedReturn": 5,
          "duration": "10.7"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_eq!(request.inputs.expect("complete").duration, 10);
    }

    #[test]
    fn negative_duration_lands_on_zero_years() {
        let json = r#"{
          "initialInvestment": 1000,
          "monthlyInvestment": 100,
          "expectedReturn": 5,
          "duration": -3
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_eq!(request.inputs.expect("complete").duration, 0);
    }

    #[test]
    fn build_inputs_rejects_negative_initial_investment() {
        let mut cli = sample_cli();
        cli.initial_investment = -1.0;
        let err = build_inputs(cli).expect_err("must reject negative start");
        assert!(err.contains("--initial-investment"));
    }

    #[test]
    fn build_inputs_rejects_negative_monthly_investment() {
        let mut cli = sample_cli();
        cli.monthly_investment = -50.0;
        let err = build_inputs(cli).expect_err("must reject negative contribution");
        assert!(err.contains("--monthly-investment"));
    }

    #[test]
    fn build_inputs_rejects_total_loss_rate() {
        let mut cli = sample_cli();
        cli.expected_return = -100.0;
        let err = build_inputs(cli).expect_err("must reject <= -100 rate");
        assert!(err.contains("--expected-return"));
    }

    #[test]
    fn build_inputs_rejects_excessive_duration() {
        let mut cli = sample_cli();
        cli.duration = MAX_DURATION_YEARS + 1;
        let err = build_inputs(cli).expect_err("must reject excessive horizon");
        assert!(err.contains("--duration"));
    }

    #[test]
    fn build_inputs_clears_non_positive_target() {
        let mut cli = sample_cli();
        cli.target_amount = Some(0.0);
        let inputs = build_inputs(cli).expect("valid inputs");
        assert_eq!(inputs.target_amount, None);

        let mut cli = sample_cli();
        cli.target_amount = Some(-500.0);
        let inputs = build_inputs(cli).expect("valid inputs");
        assert_eq!(inputs.target_amount, None);
    }

    #[test]
    fn calculate_response_serialization_contains_expected_fields() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        let response = build_calculate_response(&inputs);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"snapshots\""));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"goal\""));
        assert!(json.contains("\"valueEndOfYear\""));
        assert!(json.contains("\"cumulativeInvested\""));
        assert!(json.contains("\"roiPercentage\""));
        assert!(json.contains("\"avgAnnualGrowth\""));
    }

    #[test]
    fn complete_request_produces_goal_section_when_target_set() {
        let mut cli = sample_cli();
        cli.target_amount = Some(150_000.0);
        let inputs = build_inputs(cli).expect("valid inputs");
        let response = build_calculate_response(&inputs);

        assert_eq!(response.snapshots.len(), 10);
        let goal = response.goal.expect("target set");
        assert!(!goal.target_reached);
        assert_approx(goal.estimated_years_to_goal.expect("reachable"), 2.3);
    }

    #[test]
    fn incomplete_response_is_the_neutral_document() {
        let response = CalculateResponse::incomplete();
        let value = serde_json::to_value(&response).expect("serializes");

        assert_eq!(value["snapshots"].as_array().expect("array").len(), 0);
        assert_eq!(value["summary"]["finalValue"], 0.0);
        assert_eq!(value["summary"]["roiPercentage"], 0.0);
        assert!(value["goal"].is_null());
    }

    #[test]
    fn run_calc_prints_full_document() {
        let args = [
            "--initial-investment",
            "10000",
            "--monthly-investment",
            "500",
            "--expected-return",
            "8",
            "--duration",
            "10",
            "--target-amount",
            "150000",
        ]
        .map(str::to_string);

        let json = run_calc(args).expect("valid invocation");
        let value = serde_json::from_str::<serde_json::Value>(&json).expect("valid JSON");
        assert_eq!(value["snapshots"].as_array().expect("array").len(), 10);
        assert_approx(
            value["summary"]["totalInvested"].as_f64().expect("number"),
            70_000.0,
        );
        assert!(value["goal"]["targetReached"].is_boolean());
    }

    #[test]
    fn run_calc_surfaces_validation_errors() {
        let args = [
            "--initial-investment",
            "-5",
            "--monthly-investment",
            "500",
            "--expected-return",
            "8",
            "--duration",
            "10",
        ]
        .map(str::to_string);

        let err = run_calc(args).expect_err("must reject negative start");
        assert!(err.contains("--initial-investment"));
    }
}
