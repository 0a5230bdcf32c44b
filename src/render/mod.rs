//! Rendering of configuration artifacts.
//!
//! Each function takes settings values and returns the literal text of one
//! artifact; no file or process access happens here. Values are
//! interpolated verbatim, with no quoting: callers own the risk of values
//! that could break the surrounding syntax (a password containing `'`
//! would corrupt the generated SQL, for example).

use include_dir::{Dir, include_dir};
use minijinja::{Environment, context};

use crate::domain::AppError;

static TEMPLATES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/templates");

fn environment() -> Result<Environment<'static>, AppError> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);

    for file in TEMPLATES_DIR.files() {
        let Some(path) = file.path().to_str() else { continue };
        let Some(name) = path.strip_suffix(".j2") else { continue };
        let source = file.contents_utf8().ok_or_else(|| AppError::TemplateRender {
            template: name.to_string(),
            details: "embedded template is not valid UTF-8".to_string(),
        })?;
        env.add_template(name, source).map_err(|e| AppError::TemplateRender {
            template: name.to_string(),
            details: e.to_string(),
        })?;
    }

    Ok(env)
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, AppError> {
    let env = environment()?;
    let template = env.get_template(name).map_err(|e| AppError::TemplateRender {
        template: name.to_string(),
        details: e.to_string(),
    })?;
    template.render(ctx).map_err(|e| AppError::TemplateRender {
        template: name.to_string(),
        details: e.to_string(),
    })
}

/// SQL bootstrap: database, least-privilege application user, admin user,
/// and removal of the anonymous users and test database.
pub fn mysql_bootstrap(
    db_name: &str,
    db_user: &str,
    db_password: &str,
    db_root_password: &str,
) -> Result<String, AppError> {
    render(
        "mysql_bootstrap.sql",
        context! { db_name, db_user, db_password, db_root_password },
    )
}

/// Human-readable credentials report saved next to the operator's home.
pub fn mysql_credentials(
    db_name: &str,
    db_user: &str,
    db_password: &str,
    db_root_password: &str,
) -> Result<String, AppError> {
    render(
        "mysql_credentials.txt",
        context! { db_name, db_user, db_password, db_root_password },
    )
}

/// Nginx site block for the application domain.
pub fn nginx_site(domain: &str, web_root: &str) -> Result<String, AppError> {
    render("nginx_site.conf", context! { domain, web_root })
}

/// OPcache tuning. Static content, no interpolation.
pub fn opcache_config() -> Result<&'static str, AppError> {
    TEMPLATES_DIR.get_file("opcache.ini").and_then(|file| file.contents_utf8()).ok_or_else(|| {
        AppError::TemplateRender {
            template: "opcache.ini".to_string(),
            details: "embedded template missing".to_string(),
        }
    })
}

/// Supervisor program block for the Laravel queue workers.
pub fn supervisor_worker(web_root: &str, web_user: &str) -> Result<String, AppError> {
    render("supervisor_worker.conf", context! { web_root, web_user })
}

/// fail2ban jail overrides for sshd and the Nginx filters.
pub fn fail2ban_jail(ssh_port: &str) -> Result<String, AppError> {
    render("fail2ban_jail.conf", context! { ssh_port })
}

/// SSH hardening drop-in moving the daemon to the custom port.
pub fn sshd_hardening(ssh_port: &str) -> Result<String, AppError> {
    render("sshd_hardening.conf", context! { ssh_port })
}

/// Deployment summary written at the end of a successful run.
pub fn server_info(
    domain: &str,
    web_root: &str,
    db_name: &str,
    db_user: &str,
    ssh_port: &str,
    username: &str,
    generated_at: &str,
) -> Result<String, AppError> {
    render(
        "server_info.txt",
        context! { domain, web_root, db_name, db_user, ssh_port, username, generated_at },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_bootstrap_scopes_application_user_to_its_database() {
        let sql = mysql_bootstrap("app_db", "app", "p@ss", "r00t").unwrap();

        assert!(sql.contains("CREATE DATABASE IF NOT EXISTS app_db"));
        assert!(sql.contains("CREATE USER IF NOT EXISTS 'app'@'localhost' IDENTIFIED BY 'p@ss'"));
        assert!(sql.contains("GRANT ALL PRIVILEGES ON app_db.* TO 'app'@'localhost'"));
        // The application user must never receive a global grant.
        assert!(!sql.contains("ON *.* TO 'app'@'localhost'"));
        assert!(sql.contains("FLUSH PRIVILEGES"));
    }

    #[test]
    fn mysql_bootstrap_grants_admin_globally() {
        let sql = mysql_bootstrap("app_db", "app", "p@ss", "r00t").unwrap();
        assert!(sql.contains("GRANT ALL PRIVILEGES ON *.* TO 'admin'@'localhost' WITH GRANT OPTION"));
        assert!(sql.contains("IDENTIFIED BY 'r00t'"));
    }

    #[test]
    fn mysql_credentials_lists_both_accounts() {
        let report = mysql_credentials("app_db", "app", "secret1", "secret2").unwrap();

        assert!(report.contains("Laravel Database: app_db"));
        assert!(report.contains("Laravel Password: secret1"));
        assert!(report.contains("Admin Password: secret2"));
        assert!(report.contains("mysql -u app -psecret1 app_db"));
    }

    #[test]
    fn nginx_site_serves_domain_from_public_directory() {
        let conf = nginx_site("example.com", "/var/www/example.com").unwrap();

        assert!(conf.contains("server_name example.com www.example.com;"));
        assert!(conf.contains("root /var/www/example.com/public;"));
        assert!(conf.contains("limit_req zone=login burst=5 nodelay;"));
        assert!(conf.contains("fastcgi_pass unix:/var/run/php/php8.3-fpm.sock;"));
    }

    #[test]
    fn supervisor_worker_runs_queue_as_web_user() {
        let conf = supervisor_worker("/var/www/example.com", "www-data").unwrap();

        assert!(conf.contains("command=php /var/www/example.com/artisan queue:work"));
        assert!(conf.contains("user=www-data"));
        assert!(conf.contains("stdout_logfile=/var/www/example.com/storage/logs/worker.log"));
        // Supervisor's own expansion syntax must survive rendering.
        assert!(conf.contains("process_name=%(program_name)s_%(process_num)02d"));
    }

    #[test]
    fn fail2ban_jail_covers_ssh_and_nginx() {
        let conf = fail2ban_jail("2222").unwrap();

        assert!(conf.contains("[sshd]"));
        assert!(conf.contains("port = 2222"));
        assert!(conf.contains("[nginx-http-auth]"));
        assert!(conf.contains("[nginx-limit-req]"));
    }

    #[test]
    fn sshd_hardening_moves_port_and_locks_root() {
        let conf = sshd_hardening("2222").unwrap();

        assert!(conf.starts_with("# Security configurations\nPort 2222\n"));
        assert!(conf.contains("PermitRootLogin no"));
        assert!(conf.contains("MaxAuthTries 3"));
    }

    #[test]
    fn server_info_summarizes_the_deployment() {
        let report = server_info(
            "example.com",
            "/var/www/example.com",
            "app_db",
            "app",
            "2222",
            "deploy",
            "2024-05-01 12:00:00 UTC",
        )
        .unwrap();

        assert!(report.contains("Generated: 2024-05-01 12:00:00 UTC"));
        assert!(report.contains("Domain: example.com"));
        assert!(report.contains("ssh -p 2222 deploy@your-server-ip"));
        // The summary points at the credentials file instead of inlining secrets.
        assert!(report.contains("See mysql_credentials.txt file"));
    }

    #[test]
    fn opcache_config_is_embedded() {
        let conf = opcache_config().unwrap();
        assert!(conf.contains("opcache.enable=1"));
        assert!(conf.contains("opcache.memory_consumption=256"));
    }

    #[test]
    fn values_interpolate_verbatim() {
        // No implicit quoting or escaping: a hostile value lands as-is.
        let sql = mysql_bootstrap("app_db", "app", "a'b", "r").unwrap();
        assert!(sql.contains("IDENTIFIED BY 'a'b'"));
    }
}
