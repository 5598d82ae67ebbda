use crate::base::neterror::NetError;
use crate::cookies::CookieJar;
use crate::http::response::HttpResponse;
use crate::http::transport::{RoundTrip, TransportRequest};
use bytes::Bytes;
use http::header::{
    HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, LOCATION, REFERER,
    WWW_AUTHENTICATE,
};
use http::{HeaderMap, Method, Request, StatusCode, Uri};
use http_body_util::Full;
use std::sync::Arc;
use url::Url;

/// Authentication endpoint. A redirect whose next hop would carry this
/// exact Referer is handed back to the caller instead of being followed.
pub const AUTH_URL: &str = "https://buy.itunes.apple.com/WebObjects/MZFinance.woa/wa/authenticate";

/// Redirects followed before giving up. Guards against redirect loops.
pub const DEFAULT_REDIRECT_LIMIT: usize = 10;

/// Drives one logical request across redirect hops.
///
/// Every hop goes through the transport, picks up cookies from the jar and
/// stores the `Set-Cookie` headers it gets back.
#[derive(Clone)]
pub struct URLRequestHttpJob {
    transport: Arc<dyn RoundTrip>,
    cookie_jar: Arc<dyn CookieJar>,
    redirect_limit: usize,
}

impl URLRequestHttpJob {
    pub fn new(transport: Arc<dyn RoundTrip>, cookie_jar: Arc<dyn CookieJar>) -> Self {
        Self {
            transport,
            cookie_jar,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
        }
    }

    pub fn with_redirect_limit(mut self, limit: usize) -> Self {
        self.redirect_limit = limit;
        self
    }

    /// Run the request to its final response. The URI must be absolute.
    pub async fn start(&self, req: Request<Bytes>) -> Result<HttpResponse, NetError> {
        let (parts, mut body) = req.into_parts();
        let mut url = Url::parse(&parts.uri.to_string()).map_err(NetError::InvalidUrl)?;
        let mut method = parts.method;
        let mut headers = parts.headers;
        let explicit_referer = headers.get(REFERER).cloned();
        let mut redirects = 0;

        loop {
            let hop = self.build_hop(&method, &url, &headers, body.clone())?;

            tracing::debug!(method = %method, url = %url, "sending request");
            let response = self.transport.round_trip(hop).await?;
            tracing::debug!(status = %response.status(), url = %url, "received response");

            self.cookie_jar.set_cookies(&url, response.headers());

            let Some(next) = redirect_target(&url, &response)? else {
                return Ok(response);
            };

            let referer = referer_for(&url, &next, explicit_referer.as_ref());
            if referer.as_deref() == Some(AUTH_URL) {
                tracing::debug!(status = %response.status(), location = %next, "not following redirect from authentication request");
                return Ok(response);
            }

            if redirects >= self.redirect_limit {
                return Err(NetError::TooManyRedirects);
            }
            redirects += 1;

            if matches!(
                response.status(),
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
            ) {
                if method != Method::GET && method != Method::HEAD {
                    method = Method::GET;
                }
                body = Bytes::new();
                headers.remove(CONTENT_TYPE);
                headers.remove(CONTENT_LENGTH);
            }

            if !is_same_or_subdomain(&url, &next) {
                headers.remove(AUTHORIZATION);
                headers.remove(WWW_AUTHENTICATE);
                headers.remove(COOKIE);
            }

            headers.remove(REFERER);
            if let Some(referer) = referer.and_then(|r| HeaderValue::from_str(&r).ok()) {
                headers.insert(REFERER, referer);
            }

            url = next;
        }
    }

    fn build_hop(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<TransportRequest, NetError> {
        let mut hop_headers = headers.clone();

        if let Some(jar_cookies) = self.cookie_jar.cookie_header(url) {
            let merged = match hop_headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                Some(existing) if !existing.is_empty() => format!("{existing}; {jar_cookies}"),
                _ => jar_cookies,
            };
            let value =
                HeaderValue::from_str(&merged).map_err(|e| NetError::CreateRequest(e.into()))?;
            hop_headers.insert(COOKIE, value);
        }

        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e: http::uri::InvalidUri| NetError::CreateRequest(e.into()))?;

        let mut hop = Request::new(Full::new(body));
        *hop.method_mut() = method.clone();
        *hop.uri_mut() = uri;
        *hop.headers_mut() = hop_headers;
        Ok(hop)
    }
}

/// The next URL when `response` is a followable redirect.
fn redirect_target(current: &Url, response: &HttpResponse) -> Result<Option<Url>, NetError> {
    let followable = matches!(
        response.status(),
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !followable {
        return Ok(None);
    }

    let Some(location) = response.headers().get(LOCATION) else {
        return Ok(None);
    };

    let location = location.to_str().map_err(|_| NetError::InvalidRedirect)?;
    let next = current.join(location).map_err(|_| NetError::InvalidRedirect)?;
    match next.scheme() {
        "http" | "https" => Ok(Some(next)),
        _ => Err(NetError::InvalidRedirect),
    }
}

/// Referer for the hop from `previous` to `next`. Nothing is sent on an
/// https to http downgrade.
fn referer_for(previous: &Url, next: &Url, explicit: Option<&HeaderValue>) -> Option<String> {
    if previous.scheme() == "https" && next.scheme() == "http" {
        return None;
    }

    if let Some(explicit) = explicit.and_then(|v| v.to_str().ok()) {
        if !explicit.is_empty() {
            return Some(explicit.to_string());
        }
    }

    let mut referer = previous.clone();
    // Credentials and fragment never leave in a Referer.
    let _ = referer.set_username("");
    let _ = referer.set_password(None);
    referer.set_fragment(None);
    Some(referer.to_string())
}

fn is_same_or_subdomain(previous: &Url, next: &Url) -> bool {
    let (Some(prev_host), Some(next_host)) = (previous.host_str(), next.host_str()) else {
        return false;
    };
    let prev_host = prev_host.to_ascii_lowercase();
    let next_host = next_host.to_ascii_lowercase();

    next_host == prev_host || next_host.ends_with(&format!(".{prev_host}"))
}
