//! Intermediate rendered-artifact files and where they end up.
//!
//! Steps render configuration text into one of these working-directory
//! names before a privileged move installs it at its system path. A name
//! still present after a run means the owning step failed before the move;
//! the standalone cleanup mode removes whatever is left.

/// SQL bootstrap script fed to the MySQL server.
pub const MYSQL_BOOTSTRAP: &str = "mysql_bootstrap.sql";
/// Nginx site block, installed under `/etc/nginx/sites-available/`.
pub const NGINX_SITE: &str = "nginx_site.conf";
/// OPcache tuning, installed under `/etc/php/8.3/fpm/conf.d/`.
pub const OPCACHE_INI: &str = "opcache.ini";
/// Supervisor program block for queue workers.
pub const SUPERVISOR_WORKER: &str = "laravel-worker.conf";
/// fail2ban jail overrides, installed under `/etc/fail2ban/jail.d/`.
pub const FAIL2BAN_JAIL: &str = "fail2ban_custom.conf";
/// SSH hardening drop-in, installed under `/etc/ssh/sshd_config.d/`.
pub const SSH_HARDENING: &str = "ssh_security.conf";

/// Every temp name any step may leave behind, in pipeline order.
pub const TEMP_ARTIFACTS: [&str; 6] = [
    MYSQL_BOOTSTRAP,
    NGINX_SITE,
    OPCACHE_INI,
    SUPERVISOR_WORKER,
    FAIL2BAN_JAIL,
    SSH_HARDENING,
];
