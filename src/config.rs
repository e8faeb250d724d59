use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
    pub site: SiteConfig,
    /// Seed credentials for the first administrator account, created at
    /// startup if no account with that email exists.
    pub bootstrap_admin: Option<AdminBootstrap>,
    /// How long a sign-in session stays valid.
    pub session_ttl: chrono::Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
    /// Origin used when building public file URLs for the local backend
    /// (scheme and host, no trailing slash).
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Gcs,
    Local,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for local storage backend
    pub local_storage_path: String,
    /// Path to GCS service account JSON (optional, defaults to ADC)
    pub gcs_credentials_file: Option<String>,
    /// Bucket holding downloadable release artifacts
    pub software_bucket: String,
    /// Bucket holding thumbnail images
    pub images_bucket: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
    /// Lowercased artifact extensions accepted by the upload endpoint,
    /// without leading dots.
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_storage_path: "./files".to_string(),
            gcs_credentials_file: None,
            software_bucket: "software-files".to_string(),
            images_bucket: "software-images".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 500 * 1024 * 1024,
            allowed_extensions: vec![
                "zip".to_string(),
                "exe".to_string(),
                "dmg".to_string(),
                "app".to_string(),
            ],
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "SoftwareHub".to_string(),
            description: "Download trusted software".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let storage_backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "gcs" => StorageBackend::Gcs,
            _ => StorageBackend::Local,
        };

        let local_storage_path =
            std::env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./files".to_string());

        let gcs_credentials_file = std::env::var("GCS_CREDENTIALS_FILE").ok();

        let software_bucket =
            std::env::var("SOFTWARE_BUCKET").unwrap_or_else(|_| "software-files".to_string());

        let images_bucket =
            std::env::var("IMAGES_BUCKET").unwrap_or_else(|_| "software-images".to_string());

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500 * 1024 * 1024); // 500MB

        let allowed_extensions: Vec<String> = std::env::var("ALLOWED_EXTENSIONS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| UploadConfig::default().allowed_extensions);

        let session_ttl_hours: i64 = std::env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(72);

        let site_name = std::env::var("SITE_NAME").unwrap_or_else(|_| "SoftwareHub".to_string());
        let site_description = std::env::var("SITE_DESCRIPTION")
            .unwrap_or_else(|_| "Download trusted software".to_string());

        let bootstrap_admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
        {
            (Ok(email), Ok(password)) => Some(AdminBootstrap {
                email,
                password,
                username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            }),
            (Ok(_), Err(_)) => {
                return Err(ConfigError::ValidationError(
                    "ADMIN_PASSWORD is required when ADMIN_EMAIL is set".to_string(),
                ))
            }
            _ => None,
        };

        let config = Config {
            server: ServerConfig {
                bind_address,
                data_dir,
                public_base_url,
            },
            storage: StorageConfig {
                backend: storage_backend,
                local_storage_path,
                gcs_credentials_file,
                software_bucket,
                images_bucket,
            },
            uploads: UploadConfig {
                max_upload_size,
                allowed_extensions,
            },
            site: SiteConfig {
                name: site_name,
                description: site_description,
            },
            bootstrap_admin,
            session_ttl: chrono::Duration::hours(session_ttl_hours.max(1)),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.is_empty() {
            return Err(ConfigError::ValidationError(
                "BIND_ADDRESS cannot be empty".to_string(),
            ));
        }

        if self.uploads.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than zero".to_string(),
            ));
        }

        if self.uploads.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "ALLOWED_EXTENSIONS cannot be empty".to_string(),
            ));
        }

        if self.storage.software_bucket.is_empty() || self.storage.images_bucket.is_empty() {
            return Err(ConfigError::ValidationError(
                "SOFTWARE_BUCKET and IMAGES_BUCKET cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Check whether an artifact extension (without the dot) is accepted.
    pub fn extension_allowed(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.uploads
            .allowed_extensions
            .iter()
            .any(|allowed| *allowed == ext)
    }
}
