use std::error::Error;
use std::process::ExitCode;

use tracing::{error, info, warn};

use rjanus::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main_impl(
    registry: &flag::Registry,
    flags: &options::GatewayFlags,
    options: &options::Options,
) -> Result<(), Box<dyn Error>> {
    if options.show_flags {
        pretty::print_value("CommandLine Flags", options)?;
        return Ok(());
    }

    let mut config = config::Config::load(&options.config_file)?;
    flags.apply_overrides(registry, &mut config);

    if let Some(path) = &options.write_config {
        config.save(path)?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }
    if options.show_config {
        pretty::print_value("The Configuration Details", &config)?;
        return Ok(());
    }

    info!(
        server_name = %config.general.server_name,
        http_port = options.http_port,
        daemonize = config.general.daemonize,
        session_timeout = config.general.session_timeout,
        "Gateway configured, nothing else to start yet"
    );
    Ok(())
}

fn main() -> ExitCode {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "rjanus".to_string());

    let mut registry = flag::Registry::new();
    let flags = match options::GatewayFlags::register(&mut registry) {
        Ok(flags) => flags,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let positional = match registry.parse(args) {
        Ok(rest) => rest,
        Err(e) => {
            eprintln!("{e}");
            registry.print_usage(&program);
            return ExitCode::from(2);
        }
    };
    let options = flags.options(&registry);

    println!("*** rjanus {VERSION}: a Janus-style gateway skeleton ***");
    if options.show_help {
        registry.print_usage(&program);
        return ExitCode::SUCCESS;
    }
    if options.show_version {
        println!("Version: {VERSION}");
        return ExitCode::SUCCESS;
    }

    let _log_guard = match logging::init(options.disable_stdout, &options.log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if !positional.is_empty() {
        warn!("Ignoring positional arguments: {}", positional.join(" "));
    }

    if let Err(e) = main_impl(&registry, &flags, &options) {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
