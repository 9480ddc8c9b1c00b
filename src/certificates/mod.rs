// ABOUTME: TLS certificate lifecycle for the public domain and its service subdomains.
// ABOUTME: Bridges the CA client, the reverse proxy and the message server's shared certificate volume.

mod authority;
mod error;
mod manager;
mod reload;
mod state;
mod store;
mod volume;

pub use authority::{
    AuthorityError, CertbotAuthority, CertificateAuthority, IssueRequest, RenewOutcome,
    renewal_not_due,
};
pub use error::CertificateError;
pub use manager::{CertificateManager, IssueReport, RenewReport, SyncReport};
pub use reload::{ExecReload, Reload, ReloadError};
pub use state::{CertificateState, InvalidTransition};
pub use store::{CertbotStore, CertificateMaterial, IssuedStore, parse_domains_line};
pub use volume::{CERT_FILE_MODE, SharedVolume};
