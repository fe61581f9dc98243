use chrono::{DateTime, Local, TimeDelta};
use log::{error, info};
use ojelectronics::config::{Config, load_env_file};
use ojelectronics::{Group, GroupId, OjClient, Temperature, UreqTransport};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "usage: ojelectronics [--env-file PATH] <command>

commands:
  groups                                  list groups and thermostats
  eco <group-id>                          switch to eco mode
  schedule <group-id>                     resume the schedule
  manual <group-id> <celsius>             hold a manual setpoint
  comfort <group-id> <celsius> <hours>    comfort setpoint for a number of hours
  boost <group-id>                        boost for one hour";

#[derive(Debug, PartialEq)]
enum Command {
    Groups,
    Eco(GroupId),
    Schedule(GroupId),
    Manual(GroupId, Temperature),
    Comfort(GroupId, Temperature, i64),
    Boost(GroupId),
}

#[derive(Debug, PartialEq)]
struct Cli {
    env_file: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<Cli, String> {
    let mut env_file: Option<PathBuf> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.into_string().map_err(|_| "argument contains invalid UTF-8".to_string())?;
        let path = if arg == "--env-file" {
            Some(args.next().ok_or("`--env-file` requires a path argument")?.into())
        } else {
            arg.strip_prefix("--env-file=").map(PathBuf::from)
        };
        match path {
            Some(_) if env_file.is_some() => return Err("`--env-file` provided more than once".to_string()),
            Some(p) if p.as_os_str().is_empty() => return Err("`--env-file` requires a path argument".to_string()),
            Some(p) => env_file = Some(p),
            None if arg.starts_with("--") => return Err(format!("unrecognised argument: {}", arg)),
            None => positional.push(arg),
        }
    }

    let group = |i: usize| -> Result<GroupId, String> {
        let raw = positional.get(i).ok_or("missing <group-id>")?;
        raw.parse().map(GroupId).map_err(|_| format!("invalid group id: {}", raw))
    };
    let celsius = |i: usize| -> Result<Temperature, String> {
        let raw = positional.get(i).ok_or("missing <celsius>")?;
        raw.parse::<f64>()
            .ok()
            .filter(|c: &f64| c.is_finite())
            .map(Temperature::of_celsius)
            .ok_or_else(|| format!("invalid temperature: {}", raw))
    };

    let (command, arity) = match positional.first().map(String::as_str) {
        Some("groups") => (Command::Groups, 1),
        Some("eco") => (Command::Eco(group(1)?), 2),
        Some("schedule") => (Command::Schedule(group(1)?), 2),
        Some("manual") => (Command::Manual(group(1)?, celsius(2)?), 3),
        Some("comfort") => {
            let raw = positional.get(3).ok_or("missing <hours>")?;
            let hours = raw
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0 && comfort_end(*h).is_some())
                .ok_or_else(|| format!("invalid hours: {}", raw))?;
            (Command::Comfort(group(1)?, celsius(2)?, hours), 4)
        }
        Some("boost") => (Command::Boost(group(1)?), 2),
        Some(other) => return Err(format!("unknown command: {}", other)),
        None => return Err("missing command".to_string()),
    };
    if positional.len() > arity {
        return Err(format!("unexpected argument: {}", positional[arity]));
    }

    Ok(Cli { env_file, command })
}

/// Local time `hours` from now, `None` when out of range.
fn comfort_end(hours: i64) -> Option<DateTime<Local>> {
    TimeDelta::try_hours(hours).and_then(|d| Local::now().checked_add_signed(d))
}

fn load_env(env_file: Option<&PathBuf>) -> Result<Option<PathBuf>, String> {
    match env_file {
        Some(path) => {
            if !path.is_file() {
                return Err(format!("env file not found: {}", path.display()));
            }
            load_env_file(path)?;
            Ok(Some(path.clone()))
        }
        None => {
            let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
            let default_path = cwd.join(".env");
            if default_path.is_file() {
                load_env_file(&default_path)?;
                Ok(Some(default_path))
            } else {
                Ok(None)
            }
        }
    }
}

fn print_group(group: &Group) {
    let mode = group
        .regulation_mode()
        .map(|m| format!("{:?}", m))
        .unwrap_or_else(|| format!("unknown ({})", group.snapshot().regulation_mode));
    println!("{} {} [{}]", group.id(), group.name(), mode);
    for t in group.thermostats() {
        println!(
            "  {} ({}) room {} floor {}{}{}",
            t.name,
            t.serial_number,
            t.room_temperature,
            t.floor_temperature,
            if t.heating { " heating" } else { "" },
            if t.online { "" } else { " offline" },
        );
    }
}

fn run(command: Command) -> Result<(), String> {
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (customer_id={}, base_url={}, http_timeout={}s)",
        cfg.customer_id.0,
        cfg.base_url,
        cfg.http_timeout.as_secs()
    );

    let transport = UreqTransport::with_base_url(cfg.base_url.as_str(), cfg.http_timeout);
    let client = OjClient::with_transport(cfg.api_key.as_str(), cfg.customer_id, Arc::new(transport));
    let session = client
        .session(&cfg.username, &cfg.password)
        .map_err(|e| format!("Sign in failed: {}", e))?;
    let groups = session.groups().map_err(|e| format!("Listing groups failed: {}", e))?;

    let target = match &command {
        Command::Groups => {
            groups.iter().for_each(print_group);
            return Ok(());
        }
        Command::Eco(id)
        | Command::Schedule(id)
        | Command::Manual(id, _)
        | Command::Comfort(id, _, _)
        | Command::Boost(id) => groups
            .iter()
            .find(|g| g.id() == *id)
            .ok_or_else(|| format!("group {} not found", id))?,
    };

    let result = match command {
        Command::Groups => Ok(()),
        Command::Eco(_) => target.eco_mode(),
        Command::Schedule(_) => target.resume_schedule(),
        Command::Manual(_, temp) => target.manual_mode(temp),
        Command::Comfort(_, temp, hours) => {
            let end_time = comfort_end(hours).ok_or_else(|| format!("invalid hours: {}", hours))?;
            target.comfort_mode(temp, end_time)
        }
        Command::Boost(_) => target.boost_mode(),
    };
    result.map_err(|e| format!("Updating group {} failed: {}", target.id(), e))
}

fn main() {
    let cli = match parse_args(std::env::args_os().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("fatal: {}\n\n{}", err, USAGE);
            std::process::exit(2);
        }
    };
    let loaded_env = match load_env(cli.env_file.as_ref()) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(path) = loaded_env {
        info!("Environment loaded from {}", path.display());
    }
    info!(
        "ojelectronics {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );

    if let Err(e) = run(cli.command) {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
