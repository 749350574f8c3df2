use std::io::{Cursor, Read};
use std::sync::MutexGuard;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use nn_digits::dataset::{one_hot, CLASSES, IMAGE_PIXELS};
use nn_digits::argmax;

use crate::state::{AppState, SharedState};

// The drawing page is embedded at compile time so the binary is self-contained.
const DRAW_PAGE: &str = include_str!("draw.html");

#[derive(Debug, Deserialize)]
struct PredictRequest {
    pixels: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct TrainRequest {
    pixels: Vec<f32>,
    label: u8,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    digit: usize,
    outputs: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct TrainResponse {
    trained_samples: usize,
    digit: usize,
    outputs: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    path: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn respond_with(status: u16, content_type: &str, body: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = body.len();
    let headers = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
        .ok()
        .into_iter()
        .collect();
    Response::new(StatusCode(status), headers, Cursor::new(body), Some(len), None)
}

pub fn html_response(body: &str) -> Response<Cursor<Vec<u8>>> {
    respond_with(200, "text/html; charset=utf-8", body.as_bytes().to_vec())
}

fn json_response<T: Serialize>(status: u16, value: &T) -> Response<Cursor<Vec<u8>>> {
    match serde_json::to_vec(value) {
        Ok(body) => respond_with(status, "application/json", body),
        Err(e) => respond_with(500, "text/plain", e.to_string().into_bytes()),
    }
}

fn bad_request(msg: impl Into<String>) -> Response<Cursor<Vec<u8>>> {
    let error = msg.into();
    warn!("rejected request: {}", error);
    json_response(400, &ErrorResponse { error })
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    respond_with(404, "text/plain", b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Routes one request and sends the response.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let path = request.url().split('?').next().unwrap_or("").to_owned();

    let response = match (method, path.as_str()) {
        (Method::Get, "/") => html_response(DRAW_PAGE),
        (Method::Post, "/predict") => match read_json::<PredictRequest>(&mut request) {
            Ok(body) => handle_predict(body, &state),
            Err(msg) => bad_request(msg),
        },
        (Method::Post, "/train") => match read_json::<TrainRequest>(&mut request) {
            Ok(body) => handle_train(body, &state),
            Err(msg) => bad_request(msg),
        },
        (Method::Post, "/save") => handle_save(&state),
        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        warn!("failed to send response for {}: {}", path, e);
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /predict` — `{"pixels": [784 values in 0..1]}`
fn handle_predict(body: PredictRequest, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    if let Err(msg) = check_pixels(&body.pixels) {
        return bad_request(msg);
    }
    let app = lock(state);
    match app.network.predict(&body.pixels) {
        Ok(outputs) => json_response(200, &PredictResponse { digit: argmax(&outputs), outputs }),
        Err(e) => bad_request(e.to_string()),
    }
}

/// `POST /train` — `{"pixels": [...], "label": 0..9}`; one SGD step on the drawing.
fn handle_train(body: TrainRequest, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    if let Err(msg) = check_pixels(&body.pixels) {
        return bad_request(msg);
    }
    if body.label as usize >= CLASSES {
        return bad_request(format!("label {} is not a digit", body.label));
    }

    let mut app = lock(state);
    let target = one_hot(body.label as usize);
    if let Err(e) = app.network.train(&body.pixels, &target) {
        return bad_request(e.to_string());
    }
    app.trained_samples += 1;

    match app.network.predict(&body.pixels) {
        Ok(outputs) => json_response(
            200,
            &TrainResponse {
                trained_samples: app.trained_samples,
                digit: argmax(&outputs),
                outputs,
            },
        ),
        Err(e) => bad_request(e.to_string()),
    }
}

/// `POST /save` — writes the live network to the configured model path.
fn handle_save(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let app = lock(state);
    match app.network.save_json(&app.model_path) {
        Ok(()) => {
            info!("saved network to {}", app.model_path.display());
            json_response(200, &SaveResponse { path: app.model_path.display().to_string() })
        }
        Err(e) => {
            warn!("failed to save network: {}", e);
            json_response(500, &ErrorResponse { error: e.to_string() })
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_json<T: DeserializeOwned>(request: &mut Request) -> Result<T, String> {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .map_err(|e| format!("could not read body: {e}"))?;
    serde_json::from_str(&body).map_err(|e| format!("invalid JSON body: {e}"))
}

fn check_pixels(pixels: &[f32]) -> Result<(), String> {
    if pixels.len() != IMAGE_PIXELS {
        return Err(format!("expected {} pixels, got {}", IMAGE_PIXELS, pixels.len()));
    }
    if pixels.iter().any(|p| !(0.0..=1.0).contains(p)) {
        return Err("pixel values must lie in [0, 1]".to_owned());
    }
    Ok(())
}

/// Locks the shared state, recovering the guard if a handler panicked.
fn lock(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
