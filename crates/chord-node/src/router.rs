//! The request router / HTTP front-end: own-vs-forward decision, local
//! serve, and the forwarding sub-protocol (§4.4 of the spec).

use actix_web::{get, head, put, web, HttpRequest, HttpResponse, Responder};
use chord_core::{hash_id, ForwardError, ForwardMethod, ForwardRequest, HopClient, RingView, Store, DEFAULT_TTL};
use std::sync::Arc;

use crate::activity::ActivityTimer;

pub struct AppState {
    pub ring: RingView,
    pub store: Arc<dyn Store>,
    pub hop_client: Arc<dyn HopClient>,
    pub activity: ActivityTimer,
}

fn ttl_from_headers(req: &HttpRequest) -> u32 {
    req.headers()
        .get("X-Chord-TTL")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_TTL)
}

fn plain_text(status: actix_web::http::StatusCode, body: impl Into<Vec<u8>>, include_body: bool) -> HttpResponse {
    let mut builder = HttpResponse::build(status);
    builder
        .insert_header(("Cache-Control", "no-store"))
        .content_type("text/plain; charset=utf-8");
    if include_body {
        builder.body(body.into())
    } else {
        builder.finish()
    }
}

fn json_array(body: Vec<String>, include_body: bool) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    builder.insert_header(("Cache-Control", "no-store"));
    if include_body {
        builder.json(body)
    } else {
        builder.content_type("application/json").finish()
    }
}

#[get("/helloworld")]
async fn helloworld(state: web::Data<AppState>) -> impl Responder {
    state.activity.touch();
    plain_text(actix_web::http::StatusCode::OK, state.ring.self_address.clone().into_bytes(), true)
}

#[head("/helloworld")]
async fn helloworld_head(state: web::Data<AppState>) -> impl Responder {
    state.activity.touch();
    plain_text(actix_web::http::StatusCode::OK, state.ring.self_address.clone().into_bytes(), false)
}

#[get("/network")]
async fn network(state: web::Data<AppState>) -> impl Responder {
    state.activity.touch();
    json_array(state.ring.neighbors(), true)
}

#[head("/network")]
async fn network_head(state: web::Data<AppState>) -> impl Responder {
    state.activity.touch();
    json_array(state.ring.neighbors(), false)
}

#[get("/storage/{key}")]
async fn get_storage(req: HttpRequest, key: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    state.activity.touch();
    route_storage(key.into_inner(), ForwardMethod::Get, None, ttl_from_headers(&req), &state).await
}

#[head("/storage/{key}")]
async fn head_storage(req: HttpRequest, key: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    state.activity.touch();
    route_storage(key.into_inner(), ForwardMethod::Head, None, ttl_from_headers(&req), &state).await
}

#[put("/storage/{key}")]
async fn put_storage(
    req: HttpRequest,
    key: web::Path<String>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> impl Responder {
    state.activity.touch();
    route_storage(key.into_inner(), ForwardMethod::Put, Some(body.to_vec()), ttl_from_headers(&req), &state).await
}

/// Own-vs-forward decision for `/storage/<key>`, independent of the actix
/// request object so it can also drive an in-process `HopClient` in tests.
pub async fn route_storage(
    key: String,
    method: ForwardMethod,
    body: Option<Vec<u8>>,
    ttl: u32,
    state: &AppState,
) -> HttpResponse {
    let include_body = !matches!(method, ForwardMethod::Head);

    if key.is_empty() {
        return plain_text(actix_web::http::StatusCode::NOT_FOUND, Vec::new(), include_body);
    }

    let key_id = hash_id(&key);

    if state.ring.is_responsible(key_id) {
        return serve_locally(method, &key, body, state, include_body).await;
    }

    if ttl == 0 {
        tracing::warn!(%key, "TTL exceeded before forwarding");
        return plain_text(actix_web::http::StatusCode::GATEWAY_TIMEOUT, "TTL exceeded".as_bytes(), include_body);
    }

    let next = state.ring.closest_preceding_finger(key_id).to_string();
    let forward_req = ForwardRequest {
        method,
        path: format!("/storage/{}", urlencoding::encode(&key)),
        body: body.unwrap_or_default(),
        ttl: ttl - 1,
    };

    tracing::debug!(%key, next = %next, ttl, "forwarding");
    match state.hop_client.forward(&next, forward_req).await {
        Ok(outcome) => {
            let status = actix_web::http::StatusCode::from_u16(outcome.status)
                .unwrap_or(actix_web::http::StatusCode::BAD_GATEWAY);
            let mut builder = HttpResponse::build(status);
            builder
                .insert_header(("Cache-Control", "no-store"))
                .content_type(outcome.content_type.clone());
            if include_body {
                builder.body(outcome.body)
            } else {
                builder.finish()
            }
        }
        Err(ForwardError::TtlExceeded) => {
            plain_text(actix_web::http::StatusCode::GATEWAY_TIMEOUT, "TTL exceeded".as_bytes(), include_body)
        }
        Err(ForwardError::Transport { peer, detail }) => {
            tracing::warn!(%peer, %detail, "forward failed");
            plain_text(
                actix_web::http::StatusCode::BAD_GATEWAY,
                format!("forward error to {peer}: {detail}").into_bytes(),
                include_body,
            )
        }
    }
}

async fn serve_locally(
    method: ForwardMethod,
    key: &str,
    body: Option<Vec<u8>>,
    state: &AppState,
    include_body: bool,
) -> HttpResponse {
    match method {
        ForwardMethod::Get | ForwardMethod::Head => match state.store.get(key).await {
            Some(value) => plain_text(actix_web::http::StatusCode::OK, value, include_body),
            None => plain_text(actix_web::http::StatusCode::NOT_FOUND, Vec::new(), include_body),
        },
        ForwardMethod::Put => {
            state.store.put(key.to_string(), body.unwrap_or_default()).await;
            plain_text(actix_web::http::StatusCode::OK, Vec::new(), include_body)
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(helloworld)
        .service(helloworld_head)
        .service(network)
        .service(network_head)
        .service(get_storage)
        .service(head_storage)
        .service(put_storage)
        .default_service(web::route().to(not_found));
}

async fn not_found() -> HttpResponse {
    plain_text(actix_web::http::StatusCode::NOT_FOUND, Vec::new(), true)
}
