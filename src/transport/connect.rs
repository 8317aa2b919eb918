//! Connection establishment.
//!
//! Dials the endpoint with a bounded connect, turns on `TCP_NODELAY`, and
//! optionally runs a TLS handshake (bounded by the same timeout) that
//! accepts any server certificate.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::latch::WarnOnce;
use super::stream::RaceStream;
use crate::core::{ConnectError, Endpoint};

/// Process-wide latch for the low-latency capability warning.
static NODELAY_WARNING: WarnOnce = WarnOnce::new();

/// Open a connection to `endpoint`.
///
/// tokio sockets carry no ambient deadline, so nothing set here bleeds into
/// later reads or writes; each of those is bounded on its own.
pub async fn connect(
    secure: bool,
    endpoint: &Endpoint,
    connect_timeout: Duration,
) -> Result<RaceStream, ConnectError> {
    let tcp = timeout(connect_timeout, TcpStream::connect(endpoint.authority()))
        .await
        .map_err(|_| ConnectError::ConnectTimeout(connect_timeout))??;

    if let Err(e) = tcp.set_nodelay(true) {
        if NODELAY_WARNING.fire() {
            warn!(error = %e, "could not disable Nagle's algorithm; trigger bytes may be coalesced");
        }
    }

    if !secure {
        debug!(%endpoint, "connected");
        return Ok(RaceStream::Plain(tcp));
    }

    wrap_tls(tcp, endpoint, connect_timeout).await
}

#[cfg(feature = "tls")]
async fn wrap_tls(
    tcp: TcpStream,
    endpoint: &Endpoint,
    handshake_timeout: Duration,
) -> Result<RaceStream, ConnectError> {
    let connector = tls::connector()?;
    let server_name = tls::server_name(&endpoint.host)?;

    // On any failure `tcp` is dropped inside the handshake future, closing it.
    let stream = timeout(handshake_timeout, connector.connect(server_name, tcp))
        .await
        .map_err(|_| ConnectError::HandshakeTimeout(handshake_timeout))??;

    debug!(%endpoint, "tls handshake complete");
    Ok(RaceStream::Tls(Box::new(stream)))
}

#[cfg(not(feature = "tls"))]
async fn wrap_tls(
    _tcp: TcpStream,
    _endpoint: &Endpoint,
    _handshake_timeout: Duration,
) -> Result<RaceStream, ConnectError> {
    Err(ConnectError::TlsUnavailable)
}

#[cfg(feature = "tls")]
mod tls {
    //! rustls client setup with certificate verification disabled.

    use std::sync::{Arc, OnceLock};

    use tokio_rustls::TlsConnector;
    use tokio_rustls::rustls::client::danger::{
        HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
    };
    use tokio_rustls::rustls::crypto::{
        CryptoProvider, ring, verify_tls12_signature, verify_tls13_signature,
    };
    use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, Error, SignatureScheme};

    use crate::core::ConnectError;

    /// Accepts every certificate; handshake signatures are still checked.
    #[derive(Debug)]
    struct AcceptAnyCertificate(Arc<CryptoProvider>);

    impl ServerCertVerifier for AcceptAnyCertificate {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, Error> {
            verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, Error> {
            verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.0.signature_verification_algorithms.supported_schemes()
        }
    }

    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();

    fn build_config() -> Result<ClientConfig, Error> {
        let provider = Arc::new(ring::default_provider());
        let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
            .with_no_client_auth();
        Ok(config)
    }

    /// Shared connector; the client config is built once per process.
    pub(super) fn connector() -> Result<TlsConnector, ConnectError> {
        if let Some(config) = CONFIG.get() {
            return Ok(TlsConnector::from(Arc::clone(config)));
        }
        let config = build_config().map_err(|e| ConnectError::Tls(e.to_string()))?;
        let config = CONFIG.get_or_init(|| Arc::new(config));
        Ok(TlsConnector::from(Arc::clone(config)))
    }

    /// SNI / verification name from the endpoint host. IPv6 brackets are
    /// stripped; IP literals are accepted.
    pub(super) fn server_name(host: &str) -> Result<ServerName<'static>, ConnectError> {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        ServerName::try_from(host.to_owned())
            .map_err(|_| ConnectError::InvalidServerName(host.to_owned()))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_server_names() {
            assert!(matches!(
                server_name("example.test").unwrap(),
                ServerName::DnsName(_)
            ));
            assert!(matches!(
                server_name("127.0.0.1").unwrap(),
                ServerName::IpAddress(_)
            ));
            assert!(matches!(
                server_name("[::1]").unwrap(),
                ServerName::IpAddress(_)
            ));
            assert!(matches!(
                server_name("not a host"),
                Err(ConnectError::InvalidServerName(_))
            ));
        }

        #[test]
        fn test_config_builds() {
            assert!(build_config().is_ok());
            assert!(connector().is_ok());
        }
    }
}
