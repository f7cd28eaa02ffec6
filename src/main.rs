use std::error::Error;

use chrono::{Local, NaiveDate, NaiveDateTime, Utc};

use taskdeck::config::TaskdeckConfig;
use taskdeck::core::category::CategoryItem;
use taskdeck::core::reminder::{self, Urgency};
use taskdeck::core::repeat::Repeat;
use taskdeck::core::task::{Task, TaskDraft};
use taskdeck::core::validate::{validate_category_name, validate_task_text};
use taskdeck::storage::JsonFileBacking;
use taskdeck::store::TaskStore;
use taskdeck::view::{View, ViewMode};

type Store = TaskStore<JsonFileBacking>;

const USAGE: &str = "usage:
  taskdeck add <text> [--due DATE[THH:MM]] [--repeat R] [--category NAME] [--desc TEXT]
  taskdeck edit <id> <text> [--due ...] [--repeat R] [--category NAME] [--desc TEXT]
  taskdeck done|archive|unarchive|rm <id>
  taskdeck list [dates|recent|categories|repeating|archived]
  taskdeck categories
  taskdeck category add <name> <color>
  taskdeck category edit <id> <name> <color>
  taskdeck category rm <id>
  taskdeck category move <from> <to>";

fn init_logging(config: &TaskdeckConfig) {
    // Journal logger filtered to crate targets at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("taskdeck") {
                let max = if taskdeck::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    taskdeck::set_debug_logging(config.debug_logging);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("taskdeck".to_string()),
        Err(e) => {
            eprintln!("warning: journal logging unavailable: {}", e);
            return;
        }
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so crate debug logs can pass through when enabled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = TaskdeckConfig::default_path()
        .map(|path| TaskdeckConfig::load(&path))
        .unwrap_or_default();
    init_logging(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut store = TaskStore::open(JsonFileBacking::new(config.document_path()));
    run(&mut store, &args)
}

fn run(store: &mut Store, args: &[String]) -> Result<(), Box<dyn Error>> {
    let Some((command, rest)) = args.split_first() else {
        return list(store, ViewMode::Dates);
    };

    match command.as_str() {
        "add" => {
            let (text, flags) = rest.split_first().ok_or(USAGE)?;
            let draft = parse_draft(store, text, flags)?;
            let id = store.add_task(draft);
            eprintln!("Added task {}", short_id(&id));
        }
        "edit" => {
            let [id, text, flags @ ..] = rest else {
                return Err(USAGE.into());
            };
            let id = resolve_task(store, id)?;
            let draft = parse_draft(store, text, flags)?;
            store.update_task(&id, draft);
            eprintln!("Updated task {}", short_id(&id));
        }
        "done" | "archive" | "unarchive" | "rm" => {
            let [id] = rest else {
                return Err(USAGE.into());
            };
            let id = resolve_task(store, id)?;
            match command.as_str() {
                "done" => store.toggle_complete(&id),
                "archive" => store.archive_task(&id),
                "unarchive" => store.unarchive_task(&id),
                _ => store.delete_task(&id),
            }
        }
        "list" => {
            let mode = match rest.first() {
                Some(m) => ViewMode::parse(m).ok_or_else(|| format!("unknown view mode '{m}'"))?,
                None => ViewMode::Dates,
            };
            return list(store, mode);
        }
        "categories" => {
            for (i, category) in store.categories().iter().enumerate() {
                println!("{:>2}  {:<20} {:<10} {}", i, category.name, category.color, short_id(&category.id));
            }
        }
        "category" => category_command(store, rest)?,
        "help" | "--help" | "-h" => println!("{USAGE}"),
        other => return Err(format!("unknown command '{other}'\n{USAGE}").into()),
    }
    Ok(())
}

fn category_command(store: &mut Store, args: &[String]) -> Result<(), Box<dyn Error>> {
    match args {
        [sub, name, color] if sub == "add" => {
            validate_category_name(name)?;
            let id = store.add_category(name.trim(), color.as_str());
            eprintln!("Added category {}", short_id(&id));
        }
        [sub, id, name, color] if sub == "edit" => {
            validate_category_name(name)?;
            let id = resolve_category(store, id)?;
            store.update_category(&id, name.trim(), color.as_str());
        }
        [sub, id] if sub == "rm" => {
            let id = resolve_category(store, id)?;
            store.delete_category(&id);
        }
        [sub, from, to] if sub == "move" => {
            store.reorder_categories(from.parse()?, to.parse()?);
        }
        _ => return Err(USAGE.into()),
    }
    Ok(())
}

fn parse_draft(store: &Store, text: &str, flags: &[String]) -> Result<TaskDraft, Box<dyn Error>> {
    let mut draft = TaskDraft::new(text.trim());
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        let value = iter.next().ok_or_else(|| format!("{flag} needs a value"))?;
        match flag.as_str() {
            "--due" => draft.reminder = Some(parse_due(value)?),
            "--repeat" => {
                draft.repeat = Repeat::parse(value).ok_or_else(|| format!("unknown repeat '{value}'"))?
            }
            "--category" => draft.category_id = Some(resolve_category(store, value)?),
            "--desc" => draft.description = Some(value.clone()),
            other => return Err(format!("unknown flag '{other}'").into()),
        }
    }
    validate_task_text(&draft.text, draft.description.as_deref())?;
    Ok(draft)
}

/// `today`, `tomorrow`, `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM`.
fn parse_due(value: &str) -> Result<chrono::DateTime<Utc>, Box<dyn Error>> {
    let today = Local::now().date_naive();
    let date_only = match value {
        "today" => Some(today),
        "tomorrow" => today.succ_opt(),
        _ => None,
    };
    if let Some(date) = date_only {
        return Ok(reminder::date_only(date));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(reminder::date_only(date));
    }
    let at = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .map_err(|_| format!("cannot parse due date '{value}'"))?;
    Ok(reminder::at_time(at.date(), at.time()))
}

fn resolve_task(store: &Store, prefix: &str) -> Result<String, Box<dyn Error>> {
    let matches: Vec<&Task> = store.tasks().iter().filter(|t| t.id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => Err(format!("no task matches '{prefix}'").into()),
        _ => Err(format!("'{prefix}' matches {} tasks", matches.len()).into()),
    }
}

/// Category by exact id, case-insensitive name, or unique id prefix.
fn resolve_category(store: &Store, key: &str) -> Result<String, Box<dyn Error>> {
    let categories = store.categories();
    if let Some(c) = categories.iter().find(|c| c.id == key || c.matches_name(key)) {
        return Ok(c.id.clone());
    }
    let matches: Vec<&CategoryItem> = categories.iter().filter(|c| c.id.starts_with(key)).collect();
    match matches.as_slice() {
        [category] => Ok(category.id.clone()),
        _ => Err(format!("no single category matches '{key}'").into()),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn list(store: &Store, mode: ViewMode) -> Result<(), Box<dyn Error>> {
    let now = Local::now();
    let view = store.view(mode, &now);
    if view.is_empty() {
        println!("Nothing in {mode}.");
        return Ok(());
    }

    match view {
        View::Dates(groups) => {
            for (bucket, tasks) in groups.iter().filter(|(_, tasks)| !tasks.is_empty()) {
                println!("{}", bucket.title());
                for task in tasks {
                    println!("{}", format_line(store, task, &now));
                }
                println!();
            }
        }
        View::Categories(groups) => {
            for group in &groups {
                println!("{}", group.title());
                for task in &group.tasks {
                    println!("{}", format_line(store, task, &now));
                }
                println!();
            }
        }
        View::List(tasks) => {
            for task in tasks {
                println!("{}", format_line(store, task, &now));
            }
        }
    }
    Ok(())
}

fn format_line(store: &Store, task: &Task, now: &chrono::DateTime<Local>) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{} {} {}", short_id(&task.id), check, task.text);

    if let Some(due) = &task.reminder {
        let marker = match reminder::urgency(due, &now.with_timezone(&Utc)) {
            Urgency::Overdue if !task.completed => " !",
            Urgency::Urgent if !task.completed => " *",
            _ => "",
        };
        line.push_str(&format!(
            "  ({}){}",
            reminder::format_schedule(due, task.effective_repeat(), now),
            marker
        ));
    }
    if let Some(category) = task.category_id.as_deref().and_then(|id| store.category(id)) {
        line.push_str(&format!("  #{}", category.name));
    }
    if task.description.is_some() {
        line.push_str("  +notes");
    }
    line
}
