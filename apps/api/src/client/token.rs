use std::io::ErrorKind;
use std::path::PathBuf;

/// Where the client finds its bearer token.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> std::io::Result<Option<String>>;
}

/// Token persisted in a local file, e.g. written after sign-in.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)
    }

    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl TokenSource for FileTokenStore {
    fn token(&self) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
pub(crate) struct StaticToken(pub Option<String>);

#[cfg(test)]
impl TokenSource for StaticToken {
    fn token(&self) -> std::io::Result<Option<String>> {
        Ok(self.0.clone())
    }
}
