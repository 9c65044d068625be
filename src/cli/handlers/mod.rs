use std::error::Error;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::kv::FileKv;
use crate::io::lock::FileLock;
use crate::io::logging;
use crate::io::persistence::Persistence;
use crate::io::recovery;
use crate::model::config::Config;
use crate::model::task::is_iso_date;
use crate::session::{Command, Outcome, Session};

/// Resolved configuration for one invocation
pub struct Env {
    pub config: Config,
    pub data_dir: PathBuf,
}

/// Read config, pick the data directory and start file logging.
pub fn load_env(data_dir_override: Option<&Path>) -> Result<Env, Box<dyn Error>> {
    let config = config_io::read_config(&config_io::config_path())?;
    let data_dir = config_io::resolve_data_dir(&config, data_dir_override);
    std::fs::create_dir_all(&data_dir)
        .map_err(|e| format!("cannot create data directory {}: {}", data_dir.display(), e))?;
    if let Err(e) = logging::init_logging(&config.log_level, &data_dir) {
        eprintln!("warning: logging disabled: {}", e);
    }
    Ok(Env { config, data_dir })
}

/// Open the file-backed session for `env`
pub fn open_session(env: &Env) -> Result<Session<FileKv>, Box<dyn Error>> {
    let kv = FileKv::open(&env.data_dir)?;
    let persistence = Persistence::new(kv).with_recovery_dir(env.data_dir.clone());
    Ok(Session::open(persistence, env.config.reorder.filtered))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let json = cli.json;
    let env = load_env(cli.data_dir.as_deref())?;

    let Some(command) = cli.command else {
        return crate::tui::run(&env);
    };

    match command {
        // Read commands
        Commands::List(args) => cmd_list(&env, args, json),
        Commands::Theme(args) if !args.cycle => cmd_theme_show(&env, json),
        Commands::Recovery(args) => cmd_recovery(&env, args, json),

        // Write commands
        Commands::Add(args) => cmd_add(&env, args, json),
        Commands::Done(args) => {
            let id = args.id.clone();
            mutate(&env, Command::ToggleDone(args.id), |session| {
                if let Some(task) = session.store().get(&id) {
                    let state = if task.done { "done" } else { "todo" };
                    println!("{} {}", id, state);
                }
            })
        }
        Commands::Rm(args) => mutate(&env, Command::Remove(args.id.clone()), |_| {
            println!("{} removed", args.id)
        }),
        Commands::Edit(args) => mutate(
            &env,
            Command::UpdateText {
                id: args.id,
                text: args.text,
            },
            |_| {},
        ),
        Commands::Date(args) => {
            let date = args.date.unwrap_or_default();
            if !date.is_empty() {
                check_date(&date)?;
            }
            mutate(&env, Command::UpdateDate { id: args.id, date }, |_| {})
        }
        Commands::Reorder(args) => cmd_reorder(&env, args, json),
        Commands::Sort => mutate(&env, Command::BulkSort, |session| {
            print_list(session, json)
        }),
        Commands::Theme(_) => mutate(&env, Command::CycleTheme, |session| {
            print_theme(session, json)
        }),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_date(date: &str) -> Result<(), Box<dyn Error>> {
    if is_iso_date(date) {
        Ok(())
    } else {
        Err(format!("invalid date '{}': expected YYYY-MM-DD", date).into())
    }
}

/// Apply one command under the data directory lock. Rejections become
/// errors so the user sees them; a failed save is an error too.
fn mutate<F>(env: &Env, command: Command, report: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&Session<FileKv>),
{
    let _lock = FileLock::acquire_default(&env.data_dir)?;
    let mut session = open_session(env)?;
    let outcome = session.apply(command);
    check_outcome(&outcome)?;
    report(&session);
    Ok(())
}

fn check_outcome(outcome: &Outcome) -> Result<(), Box<dyn Error>> {
    if let Some(err) = &outcome.rejected {
        return Err(err.to_string().into());
    }
    if outcome.changed && !outcome.persisted {
        return Err("change could not be saved (see `dl recovery`)".into());
    }
    Ok(())
}

fn print_list(session: &Session<FileKv>, json: bool) {
    let projection = session.projection();
    if json {
        let filter = session.filter_date();
        let out = ListJson {
            filter: (!filter.is_empty()).then_some(filter),
            tasks: projection.iter().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        for task in projection.iter() {
            println!("{}", format_task_line(task));
        }
    }
}

fn print_theme(session: &Session<FileKv>, json: bool) {
    if json {
        let out = ThemeJson {
            theme: session.theme(),
        };
        println!("{}", serde_json::to_string(&out).unwrap_or_default());
    } else {
        println!("{}", session.theme());
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list(env: &Env, args: ListArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let mut session = open_session(env)?;
    if args.today {
        session.apply(Command::FilterToday);
    } else if let Some(date) = args.date {
        check_date(&date)?;
        session.apply(Command::SetFilter(date));
    }
    print_list(&session, json);
    Ok(())
}

fn cmd_theme_show(env: &Env, json: bool) -> Result<(), Box<dyn Error>> {
    let session = open_session(env)?;
    print_theme(&session, json);
    Ok(())
}

fn cmd_add(env: &Env, args: AddArgs, json: bool) -> Result<(), Box<dyn Error>> {
    if let Some(date) = &args.date {
        check_date(date)?;
    }
    let _lock = FileLock::acquire_default(&env.data_dir)?;
    let mut session = open_session(env)?;
    let outcome = session.apply(Command::Add {
        text: args.text,
        date: args.date,
    });
    check_outcome(&outcome)?;

    let Some(task) = outcome.created.as_deref().and_then(|id| session.store().get(id)) else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        println!("{}", task.id);
    }
    Ok(())
}

fn cmd_reorder(env: &Env, args: ReorderArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let _lock = FileLock::acquire_default(&env.data_dir)?;
    let mut session = open_session(env)?;
    if let Some(date) = args.date {
        check_date(&date)?;
        session.apply(Command::SetFilter(date));
    }

    let displayed = session.projection().ids();
    let unknown: Vec<&str> = args
        .ids
        .iter()
        .filter(|id| !displayed.contains(id))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(format!("not in the listed view: {}", unknown.join(", ")).into());
    }

    let outcome = session.apply(Command::Reorder(args.ids));
    check_outcome(&outcome)?;
    print_list(&session, json);
    Ok(())
}

fn cmd_recovery(env: &Env, args: RecoveryArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let entries = recovery::read_recovery_entries(&env.data_dir, Some(args.limit));
    if json {
        let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for entry in &entries {
            print!("{}", entry.to_display_markdown());
        }
    }
    Ok(())
}
