// ABOUTME: The host directory shared with the message server that receives synced certificates.
// ABOUTME: Files are written to a temporary name, owned and moded, then renamed into place.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::config::FileOwner;
use crate::types::Domain;

/// Mode of synced certificate and key files.
pub const CERT_FILE_MODE: u32 = 0o640;

#[derive(Debug, Clone)]
pub struct SharedVolume {
    dir: PathBuf,
    owner: Option<FileOwner>,
}

impl SharedVolume {
    pub fn new(dir: impl Into<PathBuf>, owner: Option<FileOwner>) -> Self {
        Self {
            dir: dir.into(),
            owner,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cert_path(&self, domain: &Domain) -> PathBuf {
        self.dir.join(format!("{}.crt", domain))
    }

    pub fn key_path(&self, domain: &Domain) -> PathBuf {
        self.dir.join(format!("{}.key", domain))
    }

    /// Current certificate and key bytes, or `None` if either is missing.
    pub fn read(&self, domain: &Domain) -> std::io::Result<Option<(Vec<u8>, Vec<u8>)>> {
        let cert = read_optional(&self.cert_path(domain))?;
        let key = read_optional(&self.key_path(domain))?;
        Ok(cert.zip(key))
    }

    /// Install certificate then key for `domain`.
    pub fn install(
        &self,
        domain: &Domain,
        certificate: &[u8],
        private_key: &[u8],
    ) -> Result<(), (PathBuf, std::io::Error)> {
        fs::create_dir_all(&self.dir).map_err(|e| (self.dir.clone(), e))?;
        let cert_path = self.cert_path(domain);
        self.write_atomic(&cert_path, certificate)
            .map_err(|e| (cert_path, e))?;
        let key_path = self.key_path(domain);
        self.write_atomic(&key_path, private_key)
            .map_err(|e| (key_path, e))?;
        Ok(())
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self.dir.join(format!(".{}.tmp", file_name));

        let result = (|| {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(CERT_FILE_MODE))?;
            if let Some(owner) = self.owner {
                std::os::unix::fs::chown(&tmp, Some(owner.uid), Some(owner.gid))?;
            }
            fs::rename(&tmp, target)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}

fn read_optional(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
