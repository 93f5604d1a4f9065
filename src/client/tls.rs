//! TLS trust configuration.
//!
//! Server certificates are always validated. Trust comes from the Mozilla
//! root set bundled by `webpki-roots` or from an explicit CA bundle.

use std::{fmt, path::Path, sync::Arc};

use rustls::{
    ClientConfig,
    RootCertStore,
    pki_types::{CertificateDer, pem::PemObject},
};
use tokio_rustls::TlsConnector;

use super::TlsConfigError;

/// Client-side TLS settings shared by every connection from a builder.
///
/// # Examples
///
/// ```
/// use lumberjack::client::TlsConfig;
///
/// let tls = TlsConfig::with_webpki_roots().expect("default TLS configuration");
/// let _ = tls;
/// ```
#[derive(Clone)]
pub struct TlsConfig {
    inner: Arc<ClientConfig>,
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig")
            .field("alpn_protocols", &self.inner.alpn_protocols)
            .finish_non_exhaustive()
    }
}

impl TlsConfig {
    /// Trust the Mozilla root certificates.
    ///
    /// # Errors
    ///
    /// Returns [`TlsConfigError::Rustls`] if the crypto provider rejects the
    /// default protocol versions.
    pub fn with_webpki_roots() -> Result<Self, TlsConfigError> {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        Self::with_root_store(roots)
    }

    /// Trust only the CA certificates in a PEM bundle.
    ///
    /// # Errors
    ///
    /// Returns [`TlsConfigError::Pem`] for unparsable input,
    /// [`TlsConfigError::NoCertificates`] when the bundle holds no
    /// certificate and [`TlsConfigError::Rustls`] when rustls rejects one.
    pub fn from_ca_pem(pem: &[u8]) -> Result<Self, TlsConfigError> {
        let certs = CertificateDer::pem_slice_iter(pem).collect::<Result<Vec<_>, _>>()?;
        Self::from_certificates(certs)
    }

    /// Trust only the CA certificates in a PEM file.
    ///
    /// # Errors
    ///
    /// As [`from_ca_pem`](Self::from_ca_pem), plus [`TlsConfigError::Pem`]
    /// when the file cannot be read.
    pub fn from_ca_pem_file(path: impl AsRef<Path>) -> Result<Self, TlsConfigError> {
        let certs = CertificateDer::pem_file_iter(path)?.collect::<Result<Vec<_>, _>>()?;
        Self::from_certificates(certs)
    }

    /// Trust the certificates in `roots`.
    ///
    /// # Errors
    ///
    /// Returns [`TlsConfigError::Rustls`] if the crypto provider rejects the
    /// default protocol versions.
    pub fn with_root_store(roots: RootCertStore) -> Result<Self, TlsConfigError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(Self::from_client_config(Arc::new(config)))
    }

    /// Use a fully custom rustls configuration.
    #[must_use]
    pub fn from_client_config(config: Arc<ClientConfig>) -> Self { Self { inner: config } }

    /// The underlying rustls configuration.
    #[must_use]
    pub fn client_config(&self) -> &Arc<ClientConfig> { &self.inner }

    pub(crate) fn connector(&self) -> TlsConnector { TlsConnector::from(Arc::clone(&self.inner)) }

    fn from_certificates(certs: Vec<CertificateDer<'static>>) -> Result<Self, TlsConfigError> {
        if certs.is_empty() {
            return Err(TlsConfigError::NoCertificates);
        }
        let mut roots = RootCertStore::empty();
        for cert in certs {
            roots.add(cert)?;
        }
        Self::with_root_store(roots)
    }
}
