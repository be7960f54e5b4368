//! HTTP carrier for the session protocol. One endpoint, one header:
//! `POST /mcp` routes a JSON-RPC request into the session layer,
//! `DELETE /mcp` closes a session. The `Mcp-Session-Id` header carries
//! the opaque session identifier on every request after the first.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};

use crate::protocol::{json_rpc_error, NO_SESSION, PARSE_ERROR, SESSION_EXPIRED};
use crate::session::{RouterError, SessionRouter};

pub const SESSION_HEADER: &str = "Mcp-Session-Id";
const ENDPOINT: &str = "/mcp";

pub async fn serve(addr: SocketAddr, router: Arc<SessionRouter>) -> Result<()> {
    let make_svc = make_service_fn(move |_conn| {
        let router = router.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(router.clone(), req)))
        }
    });

    log::info!("listening on http://{addr}{ENDPOINT}");
    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}

async fn handle(
    router: Arc<SessionRouter>,
    req: Request<Body>,
) -> std::result::Result<Response<Body>, Infallible> {
    if req.uri().path() != ENDPOINT {
        return Ok(plain_status(StatusCode::NOT_FOUND));
    }

    let session_id = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let method = req.method().clone();
    let response = if method == Method::POST {
        post(router, session_id, req).await
    } else if method == Method::DELETE {
        delete(router, session_id).await
    } else {
        plain_status(StatusCode::METHOD_NOT_ALLOWED)
    };
    Ok(response)
}

async fn post(
    router: Arc<SessionRouter>,
    session_id: Option<String>,
    req: Request<Body>,
) -> Response<Body> {
    let bytes = match hyper::body::to_bytes(req.into_body()).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                PARSE_ERROR,
                &format!("unreadable body: {err}"),
                None,
            )
        }
    };

    match router.handle(session_id.as_deref(), &bytes).await {
        Ok(reply) => {
            let mut builder = Response::builder()
                .header(SESSION_HEADER, &reply.session_id)
                .header("content-type", "application/json");
            match reply.body {
                Some(body) => builder
                    .status(StatusCode::OK)
                    .body(Body::from(body.to_string()))
                    .unwrap_or_else(|_| plain_status(StatusCode::INTERNAL_SERVER_ERROR)),
                // Notifications have no response payload.
                None => {
                    builder = builder.status(StatusCode::ACCEPTED);
                    builder
                        .body(Body::empty())
                        .unwrap_or_else(|_| plain_status(StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        }
        Err(err) => transport_error(err),
    }
}

async fn delete(router: Arc<SessionRouter>, session_id: Option<String>) -> Response<Body> {
    let Some(id) = session_id else {
        return error_response(
            StatusCode::BAD_REQUEST,
            NO_SESSION,
            "missing session header",
            None,
        );
    };
    match router.close(&id).await {
        Ok(()) => Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Body::empty())
            .unwrap_or_else(|_| plain_status(StatusCode::INTERNAL_SERVER_ERROR)),
        Err(err) => transport_error(err),
    }
}

/// Transport-level failures carry JSON-RPC error bodies with codes a
/// client can tell apart: an unknown session must read as "expired,
/// reinitialize", never as "unauthorized" or first contact.
fn transport_error(err: RouterError) -> Response<Body> {
    match &err {
        RouterError::UnknownSession(id) => error_response(
            StatusCode::NOT_FOUND,
            SESSION_EXPIRED,
            &err.to_string(),
            Some(id),
        ),
        RouterError::NoSession => {
            error_response(StatusCode::BAD_REQUEST, NO_SESSION, &err.to_string(), None)
        }
        RouterError::Malformed(_) => {
            error_response(StatusCode::BAD_REQUEST, PARSE_ERROR, &err.to_string(), None)
        }
    }
}

fn error_response(
    status: StatusCode,
    code: i64,
    message: &str,
    session_id: Option<&str>,
) -> Response<Body> {
    let body = json_rpc_error(None, code, message);
    let mut builder = Response::builder()
        .status(status)
        .header("content-type", "application/json");
    if let Some(id) = session_id {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| plain_status(StatusCode::INTERNAL_SERVER_ERROR))
}

fn plain_status(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}
