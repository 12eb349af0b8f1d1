//! Content server with redirect handling.
//!
//! Request order: shutdown guard, warm-up guard, the small JSON API,
//! redirect lookup, asset files, public files, 404. Redirects are consulted
//! before any filesystem access so a redirect can never be shadowed by a
//! stale file.

mod lifecycle;
mod path;
mod response;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::{self, Receiver};
use tiny_http::{Method, Request, Server};

use crate::config::{SiteConfig, cfg};
use crate::core::{ContentType, UrlPath, is_serving, is_shutdown, set_serving};
use crate::index::ContentIndex;
use crate::redirect::RedirectCache;
use crate::redirect::middleware::negotiate_locale;
use crate::registry::{ImageRegistry, scan_images};
use crate::{debug, log};

/// Bound server ready to accept requests.
pub struct BoundServer {
    server: Arc<Server>,
    shutdown_rx: Receiver<()>,
}

/// Bind the HTTP server without starting the request loop.
///
/// The caller can warm caches in the background before entering the loop;
/// requests arriving in between get a holding page.
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the request loop (blocking until shutdown).
    pub fn run(self, index: Arc<ContentIndex>) -> Result<()> {
        let cache = Arc::new(RedirectCache::new());

        // Warm the redirect table off the request path; until this finishes
        // requests get the holding page.
        {
            let config = cfg();
            let index = Arc::clone(&index);
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                if let Err(e) = cache.get_or_load(&config, &index) {
                    log!("serve"; "failed to load redirects: {e}");
                }
                set_serving();
            });
        }

        run_request_loop(&self.server, index, cache);

        if self.shutdown_rx.try_recv().is_ok() {
            log!("serve"; "stopped");
        }
        Ok(())
    }
}

/// Start the server and block until shutdown.
pub fn serve_site(index: Arc<ContentIndex>) -> Result<()> {
    bind_server()?.run(index)
}

fn run_request_loop(server: &Server, index: Arc<ContentIndex>, cache: Arc<RedirectCache>) {
    let config = cfg();
    // Thread pool so one slow filesystem read cannot block other requests
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        let index = Arc::clone(&index);
        let cache = Arc::clone(&cache);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, &index, &cache) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request.
fn handle_request(
    request: Request,
    config: &SiteConfig,
    index: &ContentIndex,
    cache: &RedirectCache,
) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    if request.url().starts_with("/_api/") {
        return handle_api(request, config, index, cache);
    }

    if !is_serving() {
        return response::respond_loading(request);
    }

    // Redirect lookup comes before any file resolution
    let url = UrlPath::from_browser(request.url());
    let accept_language = response::header_value(&request, "accept-language");
    match cache.resolve(config, index, &url, accept_language.as_deref()) {
        Ok(Some(redirection)) => {
            debug!("serve"; "{} -> {} ({})", url, redirection.to, redirection.status);
            return response::respond_redirect(request, redirection.to.as_str(), redirection.status);
        }
        Ok(None) => {}
        Err(e) => log!("serve"; "redirect lookup failed: {e}"),
    }

    // Physical assets keep their own directory outside the public tree
    let assets_prefix = format!("/{}/", crate::registry::assets_prefix(config));
    let asset_rest = request
        .url()
        .strip_prefix(assets_prefix.as_str())
        .map(str::to_string);
    if let Some(rest) = asset_rest {
        if let Some(file) = path::resolve_path(&rest, &config.assets_dir()) {
            return response::respond_file(request, &file);
        }
        return response::respond_not_found(request, config);
    }

    if let Some(file) = path::resolve_path(request.url(), &config.public_dir()) {
        return response::respond_file(request, &file);
    }

    response::respond_not_found(request, config)
}

/// Small management API: content refresh, content lookups and the image
/// drift report.
fn handle_api(
    request: Request,
    config: &SiteConfig,
    index: &ContentIndex,
    cache: &RedirectCache,
) -> Result<()> {
    let url = UrlPath::from_browser(request.url());
    match (request.method().clone(), url.as_str()) {
        (Method::Post, "/_api/refresh") => {
            index.refresh(config)?;
            cache.clear();
            log!("serve"; "content index refreshed");
            response::respond_json(request, 200, r#"{"status":"ok"}"#.to_string())
        }
        (Method::Get, "/_api/images") => {
            let registry = ImageRegistry::load(&config.registry_path())?;
            let report = scan_images(config, &registry)?;
            response::respond_json(request, 200, serde_json::to_string_pretty(&report)?)
        }
        (Method::Get, _) if url.starts_with("/_api/content") => {
            respond_content(request, config, index, &url)
        }
        _ => response::respond_not_found(request, config),
    }
}

/// Content lookups for headless consumers: the document behind a canonical
/// URL at `/_api/content/<path>`, or the full entry listing at
/// `/_api/content`.
fn respond_content(
    request: Request,
    config: &SiteConfig,
    index: &ContentIndex,
    url: &UrlPath,
) -> Result<()> {
    let path = UrlPath::from_route(url.as_str().trim_start_matches("/_api/content"));
    if path.is_root() {
        let listing = content_listing(config, index);
        return response::respond_json(request, 200, serde_json::to_string_pretty(&listing)?);
    }

    let locale = negotiate_locale(response::header_value(&request, "accept-language").as_deref());
    match content_document(index, &path, locale)? {
        Some(doc) => response::respond_json(request, 200, serde_json::to_string_pretty(&doc)?),
        None => response::respond_not_found(request, config),
    }
}

/// Every indexed entry, in type order.
fn content_listing(config: &SiteConfig, index: &ContentIndex) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = ContentType::ALL
        .iter()
        .flat_map(|content_type| index.find_by_type(*content_type))
        .map(|entry| {
            serde_json::json!({
                "type": entry.content_type.to_string(),
                "slug": entry.slug,
                "dir": entry.dir_name,
                "title": entry.title,
                "locales": entry.locales,
                "urls": entry.canonical_urls(config),
            })
        })
        .collect();
    serde_json::Value::Array(entries)
}

/// The YAML document behind a canonical URL, converted to JSON.
fn content_document(
    index: &ContentIndex,
    path: &UrlPath,
    locale: &str,
) -> Result<Option<serde_json::Value>> {
    let Some(entry) = index.find_by_path(path.as_str()) else {
        return Ok(None);
    };
    let Some(raw) = index.file_content(&entry.slug, locale, Some(entry.content_type)) else {
        return Ok(None);
    };
    let doc: serde_yaml::Value = serde_yaml::from_str(&raw)?;
    Ok(Some(serde_json::to_value(doc)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn site() -> (TempDir, SiteConfig, ContentIndex) {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/programs/python-bootcamp"),
            "en.yml",
            "slug: python-bootcamp\ntitle: Python Bootcamp",
        );
        write_file(
            &tmp.path().join("marketing-content/pages/about"),
            "en.yml",
            "title: About",
        );
        let mut config = crate::config::test_parse_config("");
        config.root = tmp.path().to_path_buf();
        let index = ContentIndex::new(&config).unwrap();
        (tmp, config, index)
    }

    #[test]
    fn test_content_listing_covers_all_entries() {
        let (_tmp, config, index) = site();
        let listing = content_listing(&config, &index);
        let entries = listing.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        // Type order: pages before programs.
        assert_eq!(entries[0]["slug"], "about");
        assert_eq!(entries[0]["dir"], "about");
        assert_eq!(entries[1]["type"], "programs");
        assert_eq!(entries[1]["urls"][0], "/en/career-programs/python-bootcamp");
    }

    #[test]
    fn test_content_document_resolves_canonical_url() {
        let (_tmp, _config, index) = site();
        let doc = content_document(
            &index,
            &UrlPath::from_route("/en/career-programs/python-bootcamp"),
            "en",
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc["title"], "Python Bootcamp");

        let miss = content_document(&index, &UrlPath::from_route("/nope"), "en").unwrap();
        assert!(miss.is_none());
    }
}
