//! The server's route table.
//!
//! | Method | Prefix        | Behavior                                   |
//! |--------|---------------|--------------------------------------------|
//! | GET    | `/`           | 200, empty body                            |
//! | GET    | `/index.html` | 200, empty body                            |
//! | GET    | `/echo`       | echoes the suffix, gzipped if accepted     |
//! | GET    | `/user-agent` | echoes the `user-agent` header             |
//! | GET    | `/files`      | file contents from the serving directory   |
//! | POST   | `/files`      | writes the body into the serving directory |
//! | POST   | `/user`       | echoes a JSON object                       |
//! | GET    | `/status`     | `{"message":"ok"}`                         |

pub mod files;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::http::router::{PrefixMatch, Router};

pub use files::FileStore;

#[derive(Debug, Serialize)]
struct StatusMessage {
    message: &'static str,
}

/// Builds the router with every route above registered in order.
pub fn routes(directory: impl Into<PathBuf>, mode: PrefixMatch) -> Router {
    let store = Arc::new(FileStore::new(directory));
    let mut router = Router::new(mode);

    router.register(Method::GET, "/", |_, res| res.send());
    router.register(Method::GET, "/index.html", |_, res| res.send());
    router.register(Method::GET, "/echo", echo);
    router.register(Method::GET, "/user-agent", user_agent);

    let get_store = Arc::clone(&store);
    router.register(Method::GET, "/files", move |req: &Request, res| {
        get_store.read_file(req, res)
    });
    router.register(Method::POST, "/files", move |req: &Request, res| {
        store.write_file(req, res)
    });

    router.register(Method::POST, "/user", user);
    router.register(Method::GET, "/status", |_, res| {
        res.send_json(&StatusMessage { message: "ok" })
    });

    router
}

pub fn echo(req: &Request, res: ResponseBuilder) -> Response {
    let text = req.path.strip_prefix("/echo/").unwrap_or("");

    if req.accepts_encoding("gzip") {
        res.send_compressed(text)
    } else {
        res.header("Content-Type", "text/plain").body(text).send()
    }
}

pub fn user_agent(req: &Request, res: ResponseBuilder) -> Response {
    res.header("Content-Type", "text/plain")
        .body(req.header("user-agent").unwrap_or_default())
        .send()
}

/// Echoes a JSON object body back to the client.
pub fn user(req: &Request, res: ResponseBuilder) -> Response {
    match serde_json::from_slice::<Map<String, Value>>(&req.body) {
        Ok(fields) => res.send_json(&fields),
        Err(e) => {
            warn!(error = %e, "Rejecting /user body");
            res.status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "text/plain")
                .body("Invalid JSON")
                .send()
        }
    }
}
