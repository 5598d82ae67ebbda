use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::stream::BoxedSocket;
use crate::socket::tls::TlsConfig;
use boring::ssl::{SslConnector, SslMethod};
use tokio::net::TcpStream;
use url::Url;

/// Manages the connection process: DNS -> TCP -> SSL.
/// Roughly equivalent to net::ConnectJob.
#[derive(Debug, Clone, Default)]
pub struct ConnectJob {
    tls: TlsConfig,
}

impl ConnectJob {
    pub fn new(tls: TlsConfig) -> Self {
        Self { tls }
    }

    pub async fn connect(&self, url: &Url) -> Result<BoxedSocket, NetError> {
        let host = url.host_str().ok_or(NetError::ConnectionFailed)?;
        let port = url.port_or_known_default().ok_or(NetError::ConnectionFailed)?;

        // 1. DNS Resolution
        let bare_host = host.trim_start_matches('[').trim_end_matches(']');
        let addrs = tokio::net::lookup_host((bare_host, port))
            .await
            .dns_context(host)?;

        // 2. TCP Connect, first address that answers wins
        let mut last_err = None;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }

        let stream = match (stream, last_err) {
            (Some(s), _) => s,
            (None, Some(e)) => Err::<TcpStream, _>(e).connection_context(host, port)?,
            (None, None) => return Err(NetError::NameNotResolved),
        };

        // 3. SSL Handshake (if https)
        if url.scheme() != "https" {
            return Ok(BoxedSocket::new(stream));
        }

        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        self.tls.apply_to_builder(&mut builder)?;

        let connector = builder.build();
        let mut config = connector
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;
        let use_sni = TlsConfig::should_set_sni(host);
        config.set_use_server_name_indication(use_sni);
        config.set_verify_hostname(use_sni);

        let tls_stream = tokio_boring::connect(config, bare_host, stream)
            .await
            .map_err(|e| {
                tracing::debug!(host, error = ?e, "TLS handshake failed");
                NetError::SslProtocolError
            })?;

        Ok(BoxedSocket::new(tls_stream))
    }
}
