//! Tests for the HTTP frontend
//!
//! These tests verify:
//! - Routing of every endpoint against a live server
//! - Success and error status lines
//! - Body handling for uploads and downloads
//! - Static file serving and graceful shutdown

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;

use imgfs::http::{HttpServer, ImgFsService};
use imgfs::{Container, CreateConfig, Engine, ServerConfig};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    _temp: TempDir,
    addr: SocketAddr,
    shutdown: Arc<std::sync::atomic::AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    /// Create a container, an engine and a bound server on an ephemeral
    /// port, then run the accept loop on a background thread.
    fn start() -> Self {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("server.imgfs");
        drop(Container::create(&path, &CreateConfig::default().max_files(16)).unwrap());

        std::fs::write(temp.path().join("index.html"), "<html>imgfs</html>").unwrap();

        let engine = Arc::new(Engine::open(&path).unwrap());
        let service = Arc::new(ImgFsService::new(Arc::clone(&engine), temp.path()));

        let config = ServerConfig::default()
            .listen_addr("127.0.0.1:0")
            .web_root(temp.path());
        let mut server = HttpServer::new(config, service);
        server.bind().unwrap();

        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let handle = thread::spawn(move || {
            server.run().unwrap();
        });

        Self {
            _temp: temp,
            addr,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Send raw request bytes, return (status line, headers, body)
    fn request(&self, raw: &[u8]) -> (String, String, Vec<u8>) {
        let mut stream = TcpStream::connect(self.addr).unwrap();
        stream.write_all(raw).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).unwrap();

        let head_end = response
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("complete response head")
            + 4;
        let head = String::from_utf8(response[..head_end].to_vec()).unwrap();
        let body = response[head_end..].to_vec();

        let (status_line, headers) = head.split_once("\r\n").unwrap();
        (status_line.to_string(), headers.to_string(), body)
    }

    fn get(&self, target: &str) -> (String, String, Vec<u8>) {
        self.request(format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").as_bytes())
    }

    fn post(&self, target: &str, body: &[u8]) -> (String, String, Vec<u8>) {
        let mut raw = format!(
            "POST {target} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n",
            body.len()
        )
        .into_bytes();
        raw.extend_from_slice(body);
        self.request(&raw)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown
            .store(true, std::sync::atomic::Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
    }
}

fn sample_jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut cursor = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, image::ImageFormat::Jpeg)
        .unwrap();
    cursor.into_inner()
}

// =============================================================================
// Static Routes
// =============================================================================

#[test]
fn root_serves_the_index_page() {
    let server = TestServer::start();

    let (status, headers, body) = server.get("/");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert!(headers.contains("Content-Type: text/html"));
    assert_eq!(body, b"<html>imgfs</html>");

    let (status, _, _) = server.get("/index.html");
    assert_eq!(status, "HTTP/1.1 200 OK");
}

#[test]
fn unknown_route_is_an_error() {
    let server = TestServer::start();

    let (status, _, body) = server.get("/does/not/exist");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
    assert!(String::from_utf8(body).unwrap().starts_with("Error: "));
}

#[test]
fn wrong_method_on_insert_is_an_error() {
    let server = TestServer::start();

    let (status, _, _) = server.get("/imgfs/insert?name=x");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
}

// =============================================================================
// Engine Routes
// =============================================================================

#[test]
fn list_starts_empty() {
    let server = TestServer::start();

    let (status, headers, body) = server.get("/imgfs/list");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert!(headers.contains("Content-Type: application/json"));
    assert_eq!(body, br#"{"Images":[]}"#);
}

#[test]
fn insert_then_list_then_read_round_trips() {
    let server = TestServer::start();
    let image = sample_jpeg(120, 90, [200, 10, 10]);

    let (status, headers, _) = server.post("/imgfs/insert?name=web1", &image);
    assert_eq!(status, "HTTP/1.1 302 Found");
    assert!(headers.contains("Location: /index.html"));

    let (_, _, body) = server.get("/imgfs/list");
    assert_eq!(body, br#"{"Images":["web1"]}"#);

    let (status, headers, body) = server.get("/imgfs/read?img_id=web1&res=orig");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert!(headers.contains("Content-Type: image/jpeg"));
    assert_eq!(body, image);
}

#[test]
fn read_of_derived_resolution_returns_a_smaller_jpeg() {
    let server = TestServer::start();
    let image = sample_jpeg(320, 200, [10, 200, 10]);
    server.post("/imgfs/insert?name=pic", &image);

    let (status, _, body) = server.get("/imgfs/read?img_id=pic&res=thumb");
    assert_eq!(status, "HTTP/1.1 200 OK");

    let decoded = image::load_from_memory(&body).unwrap();
    assert!(decoded.width() <= 64 && decoded.height() <= 64);
}

#[test]
fn read_with_unknown_resolution_is_an_error() {
    let server = TestServer::start();
    server.post("/imgfs/insert?name=pic", &sample_jpeg(32, 32, [1, 1, 1]));

    let (status, _, body) = server.get("/imgfs/read?img_id=pic&res=huge");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
    assert!(String::from_utf8(body).unwrap().contains("invalid resolution"));
}

#[test]
fn read_without_parameters_is_an_error() {
    let server = TestServer::start();

    let (status, _, _) = server.get("/imgfs/read?img_id=pic");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");

    let (status, _, _) = server.get("/imgfs/read?res=thumb");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
}

#[test]
fn read_of_absent_image_is_an_error() {
    let server = TestServer::start();

    let (status, _, body) = server.get("/imgfs/read?img_id=ghost&res=orig");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
    assert!(String::from_utf8(body).unwrap().contains("not found"));
}

#[test]
fn delete_redirects_and_removes_the_image() {
    let server = TestServer::start();
    server.post("/imgfs/insert?name=pic", &sample_jpeg(32, 32, [3, 3, 3]));

    let (status, headers, _) = server.get("/imgfs/delete?img_id=pic");
    assert_eq!(status, "HTTP/1.1 302 Found");
    assert!(headers.contains("Location: /index.html"));

    let (_, _, body) = server.get("/imgfs/list");
    assert_eq!(body, br#"{"Images":[]}"#);
}

#[test]
fn delete_of_absent_image_is_an_error() {
    let server = TestServer::start();

    let (status, _, _) = server.get("/imgfs/delete?img_id=ghost");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
}

#[test]
fn duplicate_insert_surfaces_the_engine_error() {
    let server = TestServer::start();
    let image = sample_jpeg(32, 32, [9, 9, 9]);

    server.post("/imgfs/insert?name=pic", &image);
    let (status, _, body) = server.post("/imgfs/insert?name=pic", &image);

    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
    assert!(String::from_utf8(body).unwrap().contains("duplicate"));
}

#[test]
fn insert_without_body_is_an_error() {
    let server = TestServer::start();

    let (status, _, _) = server.post("/imgfs/insert?name=pic", &[]);
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
}

// =============================================================================
// Protocol Robustness
// =============================================================================

#[test]
fn malformed_request_gets_one_error_response() {
    let server = TestServer::start();

    let (status, _, _) = server.request(b"NONSENSE\r\n\r\n");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
}

#[test]
fn oversized_head_is_rejected() {
    let server = TestServer::start();

    let long_target = "/x".repeat(2000);
    let (status, _, _) =
        server.request(format!("GET {long_target} HTTP/1.1\r\n\r\n").as_bytes());
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
}

#[test]
fn concurrent_clients_are_all_served() {
    let server = Arc::new(TestServer::start());
    let image = sample_jpeg(48, 48, [77, 77, 77]);
    server.post("/imgfs/insert?name=shared", &image);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let server = Arc::clone(&server);
        let expected = image.clone();
        handles.push(thread::spawn(move || {
            let (status, _, body) = server.get("/imgfs/read?img_id=shared&res=orig");
            assert_eq!(status, "HTTP/1.1 200 OK");
            assert_eq!(body, expected);
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}
