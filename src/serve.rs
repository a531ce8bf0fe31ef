//! HTTP servers for local use, built on `tiny_http`.
//!
//! Two flavors:
//!
//! - [`serve_live`]: the writing loop. Pages are rendered per request
//!   straight from the [`Repository`], so with live reload enabled an
//!   on-disk edit shows up on the next refresh, drafts included.
//! - [`serve_static`]: serves a frozen output tree, the way the deployed
//!   site would be served.
//!
//! Neither is meant to face the public internet.

use crate::config::Config;
use crate::feed;
use crate::render::Renderer;
use crate::repo::{Error as RepoError, Repository};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use.
const MAX_PORT_RETRIES: u16 = 10;

/// Runs the dynamic preview server until the process is killed. Routes:
/// `/` (index), `/blog/<path>/` (post), `/feed.atom` (feed); everything
/// else is a 404. Templates are re-parsed per request when the repository
/// is in live-reload mode so template edits show up without a restart.
pub fn serve_live(repo: &Repository, config: &Config, port: u16) -> Result<()> {
    let (server, addr) = try_bind_port(IpAddr::V4(Ipv4Addr::LOCALHOST), port, MAX_PORT_RETRIES)?;
    crate::log!("serve"; "previewing on http://{}", addr);

    let cached = match repo.live_reload() {
        true => None,
        false => Some(Renderer::from_directory(&config.template_directory)?),
    };
    for request in server.incoming_requests() {
        let result = match &cached {
            Some(renderer) => handle_live(request, repo, config, renderer),
            // Re-parse templates per request so edits show up; a template
            // typo becomes a 500, not a dead server.
            None => match Renderer::from_directory(&config.template_directory) {
                Ok(renderer) => handle_live(request, repo, config, &renderer),
                Err(err) => serve_error(request, &err.to_string()),
            },
        };
        if let Err(e) = result {
            crate::log!("serve"; "request error: {}", e);
        }
    }

    Ok(())
}

fn handle_live(
    request: Request,
    repo: &Repository,
    config: &Config,
    renderer: &Renderer,
) -> Result<()> {
    let path = request_path(request.url());

    if path.is_empty() {
        // Drafts are visible in live-reload (preview) mode only.
        let posts = repo.all(repo.live_reload());
        return serve_html(request, renderer.render_index(&posts, config)?);
    }

    if path == "feed.atom" {
        let mut out: Vec<u8> = Vec::new();
        feed::write_feed(config, &repo.all(false), &mut out)?;
        return serve_xml(request, out);
    }

    if let Some(url_path) = path.strip_prefix("blog/") {
        return match repo.get(url_path) {
            Ok(post) => serve_html(request, renderer.render_post(&post, config)?),
            Err(RepoError::NotFound(_)) => serve_not_found(request),
        };
    }

    serve_not_found(request)
}

/// Serves a previously built output tree. Request resolution order: exact
/// file match, then directory `index.html`, then 404.
pub fn serve_static(directory: &Path, port: u16) -> Result<()> {
    if !directory.is_dir() {
        return Err(anyhow!(
            "'{}' is not a directory; build the site first",
            directory.display()
        ));
    }

    let (server, addr) = try_bind_port(IpAddr::V4(Ipv4Addr::LOCALHOST), port, MAX_PORT_RETRIES)?;
    crate::log!("serve"; "serving {} on http://{}", directory.display(), addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_static(request, directory) {
            crate::log!("serve"; "request error: {}", e);
        }
    }

    Ok(())
}

fn handle_static(request: Request, serve_root: &Path) -> Result<()> {
    let path = request_path(request.url());
    if path.split('/').any(|segment| segment == "..") {
        return serve_not_found(request);
    }
    let local_path = serve_root.join(path);

    if local_path.is_file() {
        return serve_file(request, &local_path);
    }

    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path);
        }
    }

    serve_not_found(request)
}

/// Decodes a request URL into a normalized path: query string stripped,
/// surrounding slashes trimmed.
fn request_path(url: &str) -> &str {
    url.split('?').next().unwrap_or(url).trim_matches('/')
}

fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    crate::log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => continue,
            Err(e) => {
                return Err(anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());
    request.respond(response)?;
    Ok(())
}

fn serve_html(request: Request, content: String) -> Result<()> {
    let response = Response::from_string(content).with_header(
        Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap(),
    );
    request.respond(response)?;
    Ok(())
}

fn serve_xml(request: Request, content: Vec<u8>) -> Result<()> {
    let response = Response::from_data(content).with_header(
        Header::from_bytes("Content-Type", "application/atom+xml; charset=utf-8").unwrap(),
    );
    request.respond(response)?;
    Ok(())
}

fn serve_error(request: Request, message: &str) -> Result<()> {
    let response = Response::from_string(format!("500 Internal Server Error\n\n{}", message))
        .with_status_code(StatusCode(500))
        .with_header(Header::from_bytes("Content-Type", "text/plain").unwrap());
    request.respond(response)?;
    Ok(())
}

fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::from_string("404 Not Found")
        .with_status_code(StatusCode(404))
        .with_header(Header::from_bytes("Content-Type", "text/plain").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml" | "atom") => "application/xml; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("/"), "");
        assert_eq!(request_path("/blog/a/b/"), "blog/a/b");
        assert_eq!(request_path("/feed.atom?t=123"), "feed.atom");
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(
            guess_content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("archive.bin")),
            "application/octet-stream"
        );
    }
}
