use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            worker_threads: Some(4),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; when empty it is assembled from the parts below.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    /// Run pending migrations at startup.
    #[serde(default = "default_true")]
    pub synchronize: bool,
    /// Require TLS (`sslmode=require`); switched on for `APP_ENV=production`.
    #[serde(default)]
    pub ssl: bool,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            name: String::new(),
            synchronize: true,
            ssl: false,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_secs: default_token_ttl() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            bucket: default_bucket(),
            timeout_secs: default_storage_timeout(),
        }
    }
}

fn default_true() -> bool { true }
fn default_max_upload_bytes() -> usize { 50 * 1024 * 1024 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_token_ttl() -> i64 { 12 * 60 * 60 }
fn default_bucket() -> String { "products".into() }
fn default_storage_timeout() -> u64 { 30 }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

/// Like `load_from_file`, but a missing file yields the defaults.
/// Unreadable or malformed files are still errors.
pub fn load_from_file_or_default(path: &str) -> Result<AppConfig> {
    match load_from_file(path) {
        Ok(cfg) => Ok(cfg),
        Err(e) if is_not_found(&e) => Ok(AppConfig::default()),
        Err(e) => Err(e),
    }
}

/// Load `$CONFIG_PATH` (default `config.toml`), falling back to defaults when absent.
pub fn load_optional() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file_or_default(&path)
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load `config.toml` (or defaults when absent), fill blanks from the
    /// environment and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_optional()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Some(host) = env_nonempty("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env_nonempty("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = env_nonempty("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
        if let Some(n) = env_nonempty("MAX_UPLOAD_BYTES").and_then(|v| v.parse::<usize>().ok()) {
            self.max_upload_bytes = n;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.max_upload_bytes == 0 {
            self.max_upload_bytes = default_max_upload_bytes();
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Some(url) = env_nonempty("DATABASE_URL") {
                self.url = url;
            }
        }
        if self.host.trim().is_empty() {
            self.host = env_nonempty("DB_HOST").unwrap_or_else(|| "localhost".into());
        }
        if self.port == 0 {
            self.port = env_nonempty("DB_PORT").and_then(|p| p.parse().ok()).unwrap_or(5432);
        }
        if self.username.trim().is_empty() {
            self.username = env_nonempty("DB_USERNAME").unwrap_or_else(|| "postgres".into());
        }
        if self.password.is_empty() {
            self.password = env_nonempty("DB_PASSWORD").unwrap_or_default();
        }
        if self.name.trim().is_empty() {
            self.name = env_nonempty("DB_DATABASE").unwrap_or_else(|| "catalog".into());
        }
        if let Some(sync) = env_nonempty("DB_SYNCHRONIZE") {
            self.synchronize = sync.eq_ignore_ascii_case("true");
        }
        if env_nonempty("APP_ENV").as_deref() == Some("production") {
            self.ssl = true;
        }
        if self.url.trim().is_empty() {
            self.url = self.assemble_url();
        }
    }

    fn assemble_url(&self) -> String {
        let credentials = if self.password.is_empty() {
            self.username.clone()
        } else {
            format!("{}:{}", self.username, self.password)
        };
        format!("postgres://{}@{}:{}/{}", credentials, self.host, self.port, self.name)
    }

    /// URL handed to the driver, with `sslmode=require` appended when TLS is on.
    pub fn connection_url(&self) -> String {
        if !self.ssl || self.url.contains("sslmode=") {
            return self.url.clone();
        }
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}sslmode=require", self.url, sep)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml, DATABASE_URL or DB_* variables"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Some(secret) = env_nonempty("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        if let Some(ttl) = env_nonempty("JWT_TTL_SECS").and_then(|v| v.parse::<i64>().ok()) {
            self.token_ttl_secs = ttl;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.token_ttl_secs <= 0 {
            return Err(anyhow!("auth.token_ttl_secs must be positive"));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Some(url) = env_nonempty("SUPABASE_URL") {
                self.url = url;
            }
        }
        if self.key.trim().is_empty() {
            if let Some(key) = env_nonempty("SUPABASE_KEY") {
                self.key = key;
            }
        }
        if let Some(bucket) = env_nonempty("SUPABASE_BUCKET") {
            self.bucket = bucket;
        }
        self.url = self.url.trim_end_matches('/').to_string();
    }

    fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(anyhow!("storage.url must start with http(s); set it in config.toml or SUPABASE_URL"));
        }
        if self.key.trim().is_empty() {
            return Err(anyhow!("storage.key is empty; set it in config.toml or SUPABASE_KEY"));
        }
        if self.bucket.trim().is_empty() {
            return Err(anyhow!("storage.bucket must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://app:secret@db:5432/catalog"
            synchronize = false

            [auth]
            jwt_secret = "s3cret"

            [storage]
            url = "https://example.supabase.co/"
            key = "service-key"
        "#
    }

    #[test]
    fn parses_toml_with_defaults() {
        let cfg: AppConfig = toml::from_str(sample_toml()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert!(!cfg.database.synchronize);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.auth.token_ttl_secs, 43200);
        assert_eq!(cfg.storage.bucket, "products");
        assert_eq!(cfg.server.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn database_url_is_assembled_from_parts() {
        let db = DatabaseConfig {
            host: "db.local".into(),
            port: 6543,
            username: "cat".into(),
            password: "pw".into(),
            name: "shop".into(),
            ..DatabaseConfig::default()
        };
        assert_eq!(db.assemble_url(), "postgres://cat:pw@db.local:6543/shop");
    }

    #[test]
    fn ssl_appends_sslmode() {
        let mut db = DatabaseConfig { url: "postgres://u@h:5432/d".into(), ..DatabaseConfig::default() };
        assert_eq!(db.connection_url(), "postgres://u@h:5432/d");
        db.ssl = true;
        assert_eq!(db.connection_url(), "postgres://u@h:5432/d?sslmode=require");
        db.url = "postgres://u@h:5432/d?application_name=x".into();
        assert_eq!(db.connection_url(), "postgres://u@h:5432/d?application_name=x&sslmode=require");
    }

    #[test]
    fn database_validation_rejects_non_postgres() {
        let db = DatabaseConfig { url: "mysql://u@h/d".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_err());
        let db = DatabaseConfig { url: "postgres://u@h/d".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_ok());
    }

    #[test]
    fn auth_and_storage_validation() {
        let auth = AuthConfig { jwt_secret: "  ".into(), token_ttl_secs: 60 };
        assert!(auth.validate().is_err());
        let auth = AuthConfig { jwt_secret: "k".into(), token_ttl_secs: 0 };
        assert!(auth.validate().is_err());

        let storage = StorageConfig { url: "ftp://x".into(), key: "k".into(), ..StorageConfig::default() };
        assert!(storage.validate().is_err());
        let storage = StorageConfig { url: "https://x.supabase.co".into(), key: "k".into(), ..StorageConfig::default() };
        assert!(storage.validate().is_ok());
    }

    #[test]
    fn server_normalize_fills_worker_threads() {
        let mut s = ServerConfig { worker_threads: Some(0), host: " ".into(), ..ServerConfig::default() };
        s.normalize().unwrap();
        assert_eq!(s.worker_threads, Some(4));
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn missing_file_falls_back_but_malformed_file_fails() {
        let dir = std::env::temp_dir().join(format!("catalog-configs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("absent.toml");
        let cfg = load_from_file_or_default(missing.to_str().unwrap()).unwrap();
        assert_eq!(cfg.storage.bucket, StorageConfig::default().bucket);

        let broken = dir.join("broken.toml");
        std::fs::write(&broken, "[database\nurl = ").unwrap();
        assert!(load_from_file_or_default(broken.to_str().unwrap()).is_err());

        let good = dir.join("good.toml");
        std::fs::write(&good, sample_toml()).unwrap();
        assert_eq!(load_from_file_or_default(good.to_str().unwrap()).unwrap().server.port, 8080);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
