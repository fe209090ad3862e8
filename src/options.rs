//! The gateway's command-line flags.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::flag::{Duration, FlagError, FlagId, Registry};

pub const DEF_PID_FILE: &str = "./janus.pid";
pub const DEF_LOG_FILE: &str = "./janus.log";
pub const DEF_CONFIG_FILE: &str = "./conf.yaml";
pub const DEF_HTTP_PORT: u32 = 8080;
pub const DEF_SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Handles to the gateway flags inside a [`Registry`].
#[derive(Debug, Clone, Copy)]
pub struct GatewayFlags {
    show_help: FlagId<bool>,
    show_version: FlagId<bool>,
    enable_daemon: FlagId<bool>,
    show_flags: FlagId<bool>,
    show_config: FlagId<bool>,
    disable_stdout: FlagId<bool>,
    pid_file: FlagId<String>,
    log_file: FlagId<String>,
    config_file: FlagId<String>,
    http_port: FlagId<u32>,
    session_timeout: FlagId<Duration>,
    write_config: FlagId<String>,
}

/// Flag values after parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Options {
    pub show_help: bool,
    pub show_version: bool,
    pub enable_daemon: bool,
    pub show_flags: bool,
    pub show_config: bool,
    pub disable_stdout: bool,
    pub pid_file: PathBuf,
    pub log_file: PathBuf,
    pub config_file: PathBuf,
    pub http_port: u32,
    pub session_timeout: Duration,
    /// `None` unless `-wc` was given.
    pub write_config: Option<PathBuf>,
}

impl GatewayFlags {
    pub fn register(registry: &mut Registry) -> Result<Self, FlagError> {
        Ok(GatewayFlags {
            show_help: registry.register(&["h", "help"], false, "Print help and exit")?,
            show_version: registry.register(&["v", "version"], false, "Print version and exit")?,
            enable_daemon: registry.register(
                &["d", "daemon"],
                false,
                "Launch Janus in background as a daemon",
            )?,
            show_flags: registry.register(
                &["f", "flags"],
                false,
                "Print command line flags and exit",
            )?,
            show_config: registry.register(
                &["sc", "showconfig"],
                false,
                "Print current configuration and exit",
            )?,
            disable_stdout: registry.register(
                &["N", "disable-stdout"],
                false,
                "Disable stdout based logging",
            )?,
            pid_file: registry.register(
                &["p", "pid-file"],
                DEF_PID_FILE.to_string(),
                "Open the specified PID file `path` when starting Janus",
            )?,
            log_file: registry.register(
                &["l", "log-file"],
                DEF_LOG_FILE.to_string(),
                "Open the specified log file `path` when starting Janus",
            )?,
            config_file: registry.register(
                &["c", "config-file"],
                DEF_CONFIG_FILE.to_string(),
                "Open the specified config file `path` when starting Janus",
            )?,
            http_port: registry.register(
                &["hp", "http_port"],
                DEF_HTTP_PORT,
                "Web server will be listen to http port",
            )?,
            session_timeout: registry.register(
                &["st", "session-timeout"],
                DEF_SESSION_TIMEOUT,
                "Drop sessions idle for longer than `timeout`",
            )?,
            write_config: registry.register(
                &["wc", "write-config"],
                String::new(),
                "Write the effective configuration to `path` and exit",
            )?,
        })
    }

    pub fn options(&self, registry: &Registry) -> Options {
        let write_config = registry.value(self.write_config);
        Options {
            show_help: registry.value(self.show_help),
            show_version: registry.value(self.show_version),
            enable_daemon: registry.value(self.enable_daemon),
            show_flags: registry.value(self.show_flags),
            show_config: registry.value(self.show_config),
            disable_stdout: registry.value(self.disable_stdout),
            pid_file: registry.value(self.pid_file).into(),
            log_file: registry.value(self.log_file).into(),
            config_file: registry.value(self.config_file).into(),
            http_port: registry.value(self.http_port),
            session_timeout: registry.value(self.session_timeout),
            write_config: (!write_config.is_empty()).then(|| write_config.into()),
        }
    }

    /// Copies flags given on the command line into `config`.
    ///
    /// Flags left at their defaults do not touch the configuration.
    pub fn apply_overrides(&self, registry: &Registry, config: &mut Config) {
        let general = &mut config.general;
        if registry.was_set(self.enable_daemon) {
            general.daemonize = registry.value(self.enable_daemon);
        }
        if registry.was_set(self.pid_file) {
            general.pid_file = registry.value(self.pid_file);
        }
        if registry.was_set(self.log_file) {
            general.log_to_file = registry.value(self.log_file);
        }
        if registry.was_set(self.disable_stdout) {
            general.log_to_stdout = !registry.value(self.disable_stdout);
        }
        if registry.was_set(self.session_timeout) {
            general.session_timeout = registry.value(self.session_timeout).as_secs();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parsed(args: &[&str]) -> (Registry, GatewayFlags) {
        let mut registry = Registry::new();
        let flags = GatewayFlags::register(&mut registry).unwrap();
        registry.parse(args.iter().copied()).unwrap();
        (registry, flags)
    }

    #[test]
    fn defaults() {
        let (registry, flags) = parsed(&[]);
        assert_eq!(
            flags.options(&registry),
            Options {
                show_help: false,
                show_version: false,
                enable_daemon: false,
                show_flags: false,
                show_config: false,
                disable_stdout: false,
                pid_file: PathBuf::from(DEF_PID_FILE),
                log_file: PathBuf::from(DEF_LOG_FILE),
                config_file: PathBuf::from(DEF_CONFIG_FILE),
                http_port: DEF_HTTP_PORT,
                session_timeout: DEF_SESSION_TIMEOUT,
                write_config: None,
            }
        );
    }

    #[test]
    fn short_and_long_names() {
        let (registry, flags) = parsed(&[
            "-h",
            "--daemon",
            "-c",
            "/etc/janus/conf.yaml",
            "--http_port=9090",
            "-st=5m",
            "--write-config",
            "out.yaml",
        ]);
        let options = flags.options(&registry);
        assert!(options.show_help);
        assert!(options.enable_daemon);
        assert_eq!(options.config_file, PathBuf::from("/etc/janus/conf.yaml"));
        assert_eq!(options.http_port, 9090);
        assert_eq!(options.session_timeout, Duration::from_secs(300));
        assert_eq!(options.write_config, Some(PathBuf::from("out.yaml")));
    }

    #[test]
    fn options_print_timeout_as_text() {
        let (registry, flags) = parsed(&["-st", "90s"]);
        let rendered = crate::pretty::render(&flags.options(&registry)).unwrap();
        assert!(rendered.contains("session_timeout = \"1m30s\"\n"), "{rendered}");
    }

    #[test]
    fn registering_twice_fails() {
        let mut registry = Registry::new();
        GatewayFlags::register(&mut registry).unwrap();
        assert_eq!(
            GatewayFlags::register(&mut registry).unwrap_err(),
            FlagError::DuplicateFlagName("h".to_string())
        );
    }

    #[test]
    fn overrides_only_touch_given_flags() {
        let mut config = Config::default();
        config.general.daemonize = true;
        config.general.log_to_stdout = true;
        config.general.pid_file = "/run/janus.pid".to_string();
        config.general.session_timeout = 120;

        let (registry, flags) = parsed(&["-l", "/var/log/janus.log", "-N"]);
        flags.apply_overrides(&registry, &mut config);

        assert!(config.general.daemonize);
        assert!(!config.general.log_to_stdout);
        assert_eq!(config.general.pid_file, "/run/janus.pid");
        assert_eq!(config.general.log_to_file, "/var/log/janus.log");
        assert_eq!(config.general.session_timeout, 120);
    }

    #[test]
    fn overrides_copy_daemon_and_timeout() {
        let mut config = Config::default();
        config.general.daemonize = true;

        let (registry, flags) = parsed(&["-d=false", "--session-timeout", "1h30s"]);
        flags.apply_overrides(&registry, &mut config);

        assert!(!config.general.daemonize);
        assert_eq!(config.general.session_timeout, 3630);
    }

    #[test]
    fn usage_text() {
        let mut registry = Registry::new();
        GatewayFlags::register(&mut registry).unwrap();
        assert_eq!(
            registry.usage("rjanus"),
            "Usage: rjanus [OPTIONS]...
  -h, --help
    \tPrint help and exit
  -v, --version
    \tPrint version and exit
  -d, --daemon
    \tLaunch Janus in background as a daemon
  -f, --flags
    \tPrint command line flags and exit
  -sc, --showconfig
    \tPrint current configuration and exit
  -N, --disable-stdout
    \tDisable stdout based logging
  -p, --pid-file path
    \tOpen the specified PID file path when starting Janus (default \"./janus.pid\")
  -l, --log-file path
    \tOpen the specified log file path when starting Janus (default \"./janus.log\")
  -c, --config-file path
    \tOpen the specified config file path when starting Janus (default \"./conf.yaml\")
  -hp, --http_port uint
    \tWeb server will be listen to http port (default 8080)
  -st, --session-timeout timeout
    \tDrop sessions idle for longer than timeout (default 1m0s)
  -wc, --write-config path
    \tWrite the effective configuration to path and exit
"
        );
    }
}
