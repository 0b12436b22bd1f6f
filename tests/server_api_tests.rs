use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use staffing::server::routes::route_request;
use staffing::server::{serve, MAX_BODY_BYTES};

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response should be valid json")
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request("GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
    let payload = json(&response.body);
    assert_eq!(payload["service"], "staffing-api");
    assert!(payload["time"].as_str().is_some_and(|t| t.ends_with('Z')));
}

#[test]
fn scenario_endpoint_returns_published_instance() {
    let response = route_request("GET", "/api/scenario?format=json", "");
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    let periods = payload["periods"].as_array().expect("periods should be an array");
    assert_eq!(periods.len(), 6);
    assert_eq!(periods[0]["label"], "Jan");
    assert_eq!(periods[3]["demand"], 10000.0);
    assert_eq!(payload["parameters"]["initial_experienced"], 60.0);
}

#[test]
fn evaluate_endpoint_replays_supplied_plan() {
    let response = route_request("POST", "/api/evaluate", r#"{"plan":[9,4,11,0,0,0]}"#);
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["report"]["feasible"], true);
    let cost = payload["report"]["total_cost"].as_f64().unwrap_or_default();
    assert!((cost - 1_115_479.2).abs() < 1e-6);
}

#[test]
fn evaluate_endpoint_reports_shortfall_without_failing() {
    let response = route_request("POST", "/api/evaluate", "{}");
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    assert_eq!(payload["report"]["feasible"], false);
    assert_eq!(payload["report"]["first_short_period"], "Feb");
    assert_eq!(payload["report"]["periods"][1]["feasible"], false);
}

#[test]
fn evaluate_endpoint_rejects_wrong_plan_length() {
    let response = route_request("POST", "/api/evaluate", r#"{"plan":[1,2]}"#);
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("plan has 2 entries"));
}

#[test]
fn optimize_endpoint_returns_feasible_plan() {
    let response = route_request("POST", "/api/optimize", "");
    assert_eq!(response.status_code, 200);

    let report = &json(&response.body)["report"];
    assert_eq!(report["source"], "optimizer");
    assert_eq!(report["feasible"], true);
    assert!(report["solver_objective"].as_f64().is_some());
    let cost = report["total_cost"].as_f64().unwrap_or(f64::MAX);
    assert!(cost <= 1_115_479.2 + 1e-6);
}

#[test]
fn optimize_endpoint_honours_integer_option() {
    let response = route_request("POST", "/api/optimize", r#"{"integer_trainees":true}"#);
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    let plan = payload["report"]["plan"].as_array().expect("plan should be an array");
    for value in plan {
        let value = value.as_f64().unwrap_or(0.5);
        assert!((value - value.round()).abs() <= 1e-6);
    }
}

#[test]
fn optimize_endpoint_maps_infeasible_model_to_422() {
    let body = r#"{
        "scenario": {
            "name": "overloaded",
            "periods": [{"label": "Jan", "demand": 20000}, {"label": "Feb", "demand": 1000}],
            "parameters": {
                "hours_per_experienced": 150,
                "hours_lost_per_trainee": 100,
                "cost_per_experienced": 3000,
                "cost_per_trainee": 500,
                "attrition_rate": 0.1,
                "initial_experienced": 60
            }
        }
    }"#;
    let response = route_request("POST", "/api/optimize", body);
    assert_eq!(response.status_code, 422);
    assert!(response.body.contains("infeasible"));
}

#[test]
fn invalid_scenario_returns_validation_report() {
    let body = r#"{
        "scenario": {
            "periods": [{"label": "Jan", "demand": -5}],
            "parameters": {
                "hours_per_experienced": 150,
                "hours_lost_per_trainee": 100,
                "cost_per_experienced": 3000,
                "cost_per_trainee": 500,
                "attrition_rate": 0.1,
                "initial_experienced": 60
            }
        }
    }"#;
    let response = route_request("POST", "/api/evaluate", body);
    assert_eq!(response.status_code, 400);

    let payload = json(&response.body);
    assert_eq!(payload["message"], "Validation failed");
    let diagnostics = payload["report"]["diagnostics"]
        .as_array()
        .expect("diagnostics should be an array");
    assert_eq!(diagnostics[0]["context"], "periods[0].demand");
}

#[test]
fn rank_endpoint_orders_candidates() {
    let body = r#"{"plans":[[0,0,0,0,0,0],[9,4,11,0,0,0]]}"#;
    let response = route_request("POST", "/api/rank", body);
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    assert_eq!(payload["scenario"], "published");
    let ranking = payload["ranking"].as_array().expect("ranking should be an array");
    assert_eq!(ranking[0]["index"], 1);
    assert_eq!(ranking[0]["feasible"], true);
    assert_eq!(ranking[1]["short_periods"], 4);
}

#[test]
fn rank_endpoint_requires_plans() {
    let response = route_request("POST", "/api/rank", r#"{"plans":[]}"#);
    assert_eq!(response.status_code, 400);
}

#[test]
fn malformed_json_is_a_bad_request() {
    let response = route_request("POST", "/api/evaluate", "{not json");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("\"status\": \"error\""));
}

#[test]
fn unknown_route_returns_404() {
    let response = route_request("GET", "/api/nope", "");
    assert_eq!(response.status_code, 404);
    let response = route_request("GET", "/api/evaluate", "");
    assert_eq!(response.status_code, 404);
}

fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    thread::spawn(move || serve(listener));
    addr
}

fn read_response(mut stream: TcpStream) -> (String, serde_json::Value) {
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).expect("response should be readable");
    let raw = String::from_utf8(raw).expect("response should be utf-8");
    let (head, body) = raw
        .split_once("\r\n\r\n")
        .expect("response should have a header block");
    let status_line = head.lines().next().unwrap_or_default().to_string();
    (status_line, json(body))
}

fn rank_body(plans: usize) -> String {
    let plans: Vec<String> = (0..plans)
        .map(|i| format!("[{},4,11,0,0,0]", i % 10))
        .collect();
    format!("{{\"plans\":[{}]}}", plans.join(","))
}

#[test]
fn server_waits_for_body_sent_after_headers() {
    let addr = spawn_server();
    let body = rank_body(2);
    let mut stream = TcpStream::connect(addr).expect("server should accept");
    write!(
        stream,
        "POST /api/rank HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .unwrap();
    stream.flush().unwrap();
    thread::sleep(Duration::from_millis(100));
    stream.write_all(body.as_bytes()).unwrap();

    let (status, payload) = read_response(stream);
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(payload["ranking"].as_array().map(Vec::len), Some(2));
}

#[test]
fn server_reads_bodies_larger_than_one_socket_read() {
    let addr = spawn_server();
    let body = rank_body(8_000);
    assert!(body.len() > 64 * 1024);

    let mut stream = TcpStream::connect(addr).expect("server should accept");
    let request = format!(
        "POST /api/rank HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).unwrap();

    let (status, payload) = read_response(stream);
    assert_eq!(status, "HTTP/1.1 200 OK");
    let ranking = payload["ranking"].as_array().expect("ranking should be an array");
    assert_eq!(ranking.len(), 8_000);
    assert_eq!(ranking[0]["feasible"], true);
}

#[test]
fn server_rejects_oversized_body_with_413() {
    let addr = spawn_server();
    let mut stream = TcpStream::connect(addr).expect("server should accept");
    write!(
        stream,
        "POST /api/rank HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n",
        MAX_BODY_BYTES + 1
    )
    .unwrap();

    let (status, payload) = read_response(stream);
    assert_eq!(status, "HTTP/1.1 413 Payload Too Large");
    assert_eq!(payload["status"], "error");
}
