// ABOUTME: Certificate lifecycle settings: CA client container, shared volume, reload commands.
// ABOUTME: Defaults target certbot, nginx and prosody as laid out by the chat stack.

use serde::Deserialize;
use std::path::PathBuf;

use crate::types::ContainerName;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertificatesConfig {
    /// Container running the CA client.
    pub certbot_container: ContainerName,
    /// HTTP-01 webroot shared with the reverse proxy.
    pub webroot: String,
    /// CA client storage root holding `<domain>/fullchain.pem` and `<domain>/privkey.pem`.
    pub live_dir: String,
    /// Labels that must be covered alongside the primary domain.
    pub subdomains: Vec<String>,
    /// Host directory mounted into the message server, relative to the project.
    pub shared_dir: PathBuf,
    /// Identity that owns synced files.
    pub owner: Option<FileOwner>,
    pub proxy_container: ContainerName,
    pub proxy_reload: Vec<String>,
    pub message_server_container: ContainerName,
    pub message_server_reload: Vec<String>,
    /// Registration contact; falls back to LETSENCRYPT_EMAIL, then admin@<domain>.
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileOwner {
    pub uid: u32,
    pub gid: u32,
}

impl Default for CertificatesConfig {
    fn default() -> Self {
        Self {
            certbot_container: ContainerName::from_static("chat-certbot"),
            webroot: "/var/www/certbot".to_string(),
            live_dir: "/etc/letsencrypt/live".to_string(),
            subdomains: vec!["sso".to_string(), "xmpp".to_string()],
            shared_dir: PathBuf::from("prosody/certs"),
            owner: Some(FileOwner { uid: 101, gid: 102 }),
            proxy_container: ContainerName::from_static("chat-proxy"),
            proxy_reload: vec!["nginx".to_string(), "-s".to_string(), "reload".to_string()],
            message_server_container: ContainerName::from_static("chat-server"),
            message_server_reload: vec!["prosodyctl".to_string(), "reload".to_string()],
            email: None,
        }
    }
}
