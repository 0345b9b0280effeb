//! Request routing
//!
//! The typed handler between the wire and the engine: method check
//! first, then exact-prefix match on the path. Every request produces
//! exactly one response; engine failures become `500` with the error
//! message as the body, successful mutations redirect back to the
//! index page.

use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{ImgFsError, Result};
use crate::container::Resolution;

use super::{Request, Response};

/// Static file served for `/` and `/index.html`
pub const BASE_FILE: &str = "index.html";

/// Routes HTTP requests to engine operations
pub struct ImgFsService {
    engine: Arc<Engine>,
    web_root: PathBuf,
}

impl ImgFsService {
    /// Create a service over a shared engine
    pub fn new(engine: Arc<Engine>, web_root: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            web_root: web_root.into(),
        }
    }

    /// Dispatch one request
    pub fn handle(&self, request: &Request) -> Response {
        let result = match (request.method.as_str(), request.path()) {
            ("GET", "/") | ("GET", "/index.html") => self.handle_index(),
            ("GET", path) if path.starts_with("/imgfs/list") => self.handle_list(),
            ("GET", path) if path.starts_with("/imgfs/read") => self.handle_read(request),
            ("GET", path) if path.starts_with("/imgfs/delete") => self.handle_delete(request),
            ("POST", path) if path.starts_with("/imgfs/insert") => self.handle_insert(request),
            _ => Err(ImgFsError::InvalidCommand),
        };

        match result {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!("{} {} failed: {err}", request.method, request.target);
                Response::error(&err)
            }
        }
    }

    /// `GET /`: serve the static index page
    fn handle_index(&self) -> Result<Response> {
        let path = self.web_root.join(BASE_FILE);
        let body = std::fs::read(&path)?;
        Ok(Response::ok("text/html", body))
    }

    /// `GET /imgfs/list`: all image ids as JSON
    fn handle_list(&self) -> Result<Response> {
        let json = self.engine.list_json()?;
        Ok(Response::ok("application/json", json.into_bytes()))
    }

    /// `GET /imgfs/read?img_id=..&res=..`: one image as JPEG
    fn handle_read(&self, request: &Request) -> Result<Response> {
        let img_id = required_var(request, "img_id")?;
        let res = required_var(request, "res")?;
        let resolution: Resolution = res.parse()?;

        let image = self.engine.read(img_id, resolution)?;
        Ok(Response::ok("image/jpeg", image))
    }

    /// `GET /imgfs/delete?img_id=..`: tombstone an image
    fn handle_delete(&self, request: &Request) -> Result<Response> {
        let img_id = required_var(request, "img_id")?;
        self.engine.delete(img_id)?;
        Ok(Response::found(&format!("/{BASE_FILE}")))
    }

    /// `POST /imgfs/insert?name=..`: store the body as a new image
    fn handle_insert(&self, request: &Request) -> Result<Response> {
        if request.body.is_empty() {
            return Err(ImgFsError::InvalidArgument("empty request body".to_string()));
        }
        let img_id = required_var(request, "name")?;
        self.engine.insert(&request.body, img_id)?;
        Ok(Response::found(&format!("/{BASE_FILE}")))
    }
}

/// Fetch a mandatory, non-empty query parameter
fn required_var<'a>(request: &'a Request, name: &str) -> Result<&'a str> {
    match request.query_var(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ImgFsError::NotEnoughArguments),
    }
}
