//! Throwaway certificates for TLS tests.

use std::sync::Arc;

use rustls::{
    ServerConfig,
    pki_types::{CertificateDer, PrivateKeyDer},
};
use tokio_rustls::TlsAcceptor;

/// A self-signed certificate that acts as its own trust anchor.
pub struct TestPki {
    cert_pem: String,
    cert_der: CertificateDer<'static>,
    key_der: Vec<u8>,
}

impl TestPki {
    /// Generate a certificate valid for `localhost` and `127.0.0.1`.
    ///
    /// # Panics
    ///
    /// Panics if certificate generation fails.
    #[must_use]
    pub fn localhost() -> Self {
        let certified =
            rcgen::generate_simple_self_signed(vec!["localhost".into(), "127.0.0.1".into()])
                .expect("generate test certificate");
        Self {
            cert_pem: certified.cert.pem(),
            cert_der: certified.cert.der().clone(),
            key_der: certified.key_pair.serialize_der(),
        }
    }

    /// PEM encoding of the certificate, for clients to trust.
    #[must_use]
    pub fn ca_pem(&self) -> &str { &self.cert_pem }

    /// Acceptor presenting this certificate.
    ///
    /// # Panics
    ///
    /// Panics if rustls rejects the generated key pair.
    #[must_use]
    pub fn acceptor(&self) -> TlsAcceptor {
        let key = PrivateKeyDer::Pkcs8(self.key_der.clone().into());
        let config =
            ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
                .with_safe_default_protocol_versions()
                .expect("default protocol versions")
                .with_no_client_auth()
                .with_single_cert(vec![self.cert_der.clone()], key)
                .expect("server certificate");
        TlsAcceptor::from(Arc::new(config))
    }
}
