//! mysql-lite - lightweight MySQL metrics plugin.
//!
//! Connects once, prints nine tab-separated metric lines to stdout and exits.
//! Diagnostics go to stderr.
//!
//! Usage:
//!   mysql-lite                                   # root@localhost:3306
//!   mysql-lite -H db1 -u monitor -P secret       # explicit credentials
//!   mysql-lite --mysql-socket /run/mysqld/mysqld.sock
//!   mysql-lite --defaults-extra-file /etc/mysql/monitor.cnf --timeout 5s

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{Level, debug, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use mysql_lite::config::{ConnectionConfig, ConnectionOverrides, load_options_file};
use mysql_lite::probe::{self, ProbeError};
use mysql_lite::util::parse_duration;

/// Lightweight MySQL metrics plugin.
#[derive(Parser)]
#[command(
    name = "mysql-lite",
    about = "Lightweight MySQL metrics plugin",
    disable_version_flag = true
)]
struct Args {
    /// Hostname (default: localhost).
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port (default: 3306).
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Username (default: root).
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// Password.
    #[arg(short = 'P', long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Path to the server's unix socket. Overrides host and port.
    #[arg(long = "mysql-socket", value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Database name to connect to.
    #[arg(long)]
    database: Option<String>,

    /// MySQL options file to read `[client]` settings from.
    /// Command-line flags take precedence over the file.
    #[arg(long, value_name = "PATH")]
    defaults_extra_file: Option<PathBuf>,

    /// Also read the `[client<SUFFIX>]` group from the options file.
    #[arg(long, value_name = "SUFFIX", requires = "defaults_extra_file")]
    defaults_group_suffix: Option<String>,

    /// Timeout for connecting and for each query (e.g. "10s", "500ms", "1m").
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    timeout: Duration,

    /// Show version.
    #[arg(short = 'v', long)]
    version: bool,

    /// Increase logging verbosity (--verbose for info, twice for debug, three times for trace).
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber on stderr.
/// Default level is WARN so a healthy run prints nothing but metrics.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("mysql_lite={}", level).parse::<Directive>() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merges flags, options file and defaults into one connection config.
fn resolve_config(args: &Args) -> Result<ConnectionConfig, ProbeError> {
    let flags = ConnectionOverrides {
        host: args.host.clone(),
        port: args.port,
        user: args.user.clone(),
        password: args.password.clone(),
        socket: args.socket.clone(),
        database: args.database.clone(),
    };

    let file = match &args.defaults_extra_file {
        Some(path) => load_options_file(path, args.defaults_group_suffix.as_deref())?,
        None => ConnectionOverrides::default(),
    };

    Ok(flags.or(file).resolve(args.timeout))
}

fn run(args: &Args) -> Result<(), ProbeError> {
    let config = resolve_config(args)?;
    debug!(?config, "configuration resolved");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    probe::run(&config, &mut out)?;
    Ok(())
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if args.version {
        eprintln!("Version: {}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
