//! Provisioning settings: the single record every step reads.

use serde::Deserialize;

use crate::domain::AppError;

/// Per-step skip switches.
///
/// Each effective flag is the OR of the persisted-file value and the
/// command-line override; once combined the value is final.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipFlags {
    pub system_update: bool,
    pub essentials: bool,
    pub php: bool,
    pub mysql: bool,
    pub nginx: bool,
    pub security: bool,
    pub laravel: bool,
    pub services: bool,
}

impl SkipFlags {
    /// Combine two skip sources. A true from either side wins, so a skip
    /// requested anywhere cannot be forced back off.
    pub fn combine(self, other: SkipFlags) -> SkipFlags {
        SkipFlags {
            system_update: self.system_update || other.system_update,
            essentials: self.essentials || other.essentials,
            php: self.php || other.php,
            mysql: self.mysql || other.mysql,
            nginx: self.nginx || other.nginx,
            security: self.security || other.security,
            laravel: self.laravel || other.laravel,
            services: self.services || other.services,
        }
    }
}

/// All settings for a provisioning run.
///
/// Resolved once at startup and immutable once the pipeline begins; the
/// resolver is the only component that mutates it.
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    /// Domain the site is served under.
    pub domain: String,
    /// Git repository holding the Laravel application.
    pub repo_url: String,
    pub db_name: String,
    pub db_user: String,
    /// Secret material. Never logged.
    pub db_password: String,
    /// Secret material. Never logged.
    pub db_root_password: String,
    /// Service account the web server runs as.
    pub web_user: String,
    /// Non-standard SSH port the host is moved to.
    pub ssh_port: String,
    /// Document root, `/var/www/<domain>` unless set explicitly.
    pub web_root: String,
    /// Directory of the running executable. Informational only.
    pub script_dir: String,
    pub skip: SkipFlags,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        ProvisionSettings {
            domain: String::new(),
            repo_url: String::new(),
            db_name: "production_db".to_string(),
            db_user: "db_user".to_string(),
            db_password: String::new(),
            db_root_password: String::new(),
            web_user: "www-data".to_string(),
            ssh_port: "2222".to_string(),
            web_root: String::new(),
            script_dir: String::new(),
            skip: SkipFlags::default(),
        }
    }
}

impl ProvisionSettings {
    /// Overlay values from a persisted settings file. Present fields win
    /// over the seeded defaults; skip flags accumulate via OR.
    pub fn apply_file(&mut self, file: SettingsFile) {
        let SettingsFile {
            domain,
            repo_url,
            db_name,
            db_user,
            db_password,
            db_root_password,
            web_user,
            ssh_port,
            web_root,
            skip_system_update,
            skip_essentials,
            skip_php,
            skip_mysql,
            skip_nginx,
            skip_security,
            skip_laravel,
            skip_services,
        } = file;

        if let Some(value) = domain {
            self.domain = value;
        }
        if let Some(value) = repo_url {
            self.repo_url = value;
        }
        if let Some(value) = db_name {
            self.db_name = value;
        }
        if let Some(value) = db_user {
            self.db_user = value;
        }
        if let Some(value) = db_password {
            self.db_password = value;
        }
        if let Some(value) = db_root_password {
            self.db_root_password = value;
        }
        if let Some(value) = web_user {
            self.web_user = value;
        }
        if let Some(value) = ssh_port {
            self.ssh_port = value;
        }
        if let Some(value) = web_root {
            self.web_root = value;
        }

        self.skip = self.skip.combine(SkipFlags {
            system_update: skip_system_update.unwrap_or(false),
            essentials: skip_essentials.unwrap_or(false),
            php: skip_php.unwrap_or(false),
            mysql: skip_mysql.unwrap_or(false),
            nginx: skip_nginx.unwrap_or(false),
            security: skip_security.unwrap_or(false),
            laravel: skip_laravel.unwrap_or(false),
            services: skip_services.unwrap_or(false),
        });
    }

    /// Derive the document root from the domain when not set explicitly.
    pub fn derive_web_root(&mut self) {
        if self.web_root.is_empty() && !self.domain.is_empty() {
            self.web_root = format!("/var/www/{}", self.domain);
        }
    }
}

/// On-disk settings document. Any subset of fields may be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub domain: Option<String>,
    pub repo_url: Option<String>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_root_password: Option<String>,
    pub web_user: Option<String>,
    pub ssh_port: Option<String>,
    pub web_root: Option<String>,
    pub skip_system_update: Option<bool>,
    pub skip_essentials: Option<bool>,
    pub skip_php: Option<bool>,
    pub skip_mysql: Option<bool>,
    pub skip_nginx: Option<bool>,
    pub skip_security: Option<bool>,
    pub skip_laravel: Option<bool>,
    pub skip_services: Option<bool>,
}

/// Parse a persisted settings document from TOML content.
pub fn parse_settings_content(content: &str) -> Result<SettingsFile, AppError> {
    Ok(toml::from_str(content)?)
}
