use chrono::Utc;
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use snipkeep::api::{CmdMessage, CmdResult, MessageLevel, SnipApi};
use snipkeep::commands::tree::FolderNode;
use snipkeep::config::SnipConfig;
use snipkeep::error::{Result, SnipError};
use snipkeep::model::{parse_timestamp, Snippet, UNTITLED_SNIPPET_TITLE};
use snipkeep::store::fs::FileStore;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

mod args;
use args::{Cli, Commands, FolderCommands};

const HOME_ENV: &str = "SNIPKEEP_HOME";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

struct AppContext {
    api: SnipApi<FileStore>,
    config: SnipConfig,
    data_dir: PathBuf,
}

/// Returns Ok(false) when the command reported an error to the user.
fn run(cli: Cli) -> Result<bool> {
    let (mut ctx, opened) = init_context()?;
    print_messages(&opened.messages);

    match cli.command {
        Some(Commands::Tree) | None => handle_tree(&ctx),
        Some(Commands::List { folder }) => handle_list(&ctx, folder),
        Some(Commands::Show { snippet }) => handle_show(&ctx, snippet),
        Some(Commands::Select { id }) => handle_select(&mut ctx, &id),
        Some(Commands::Folder(cmd)) => handle_folder(&mut ctx, cmd),
        Some(Commands::New { folder }) => handle_new(&mut ctx, folder),
        Some(Commands::Save { id, title, content }) => handle_save(&mut ctx, &id, title, content),
        Some(Commands::Delete { id, yes }) => handle_delete(&mut ctx, &id, yes),
        Some(Commands::Move { id, folder }) => {
            let id = ctx.api.resolve_snippet(&id)?;
            let folder = ctx.api.resolve_folder(&folder)?;
            Ok(finish(&ctx.api.move_snippet(&id, &folder)))
        }
        Some(Commands::Export { dir }) => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            Ok(finish(&ctx.api.export_to_dir(&dir, &ctx.config.export_prefix)))
        }
        Some(Commands::Import { file }) => Ok(finish(&ctx.api.import_file(&file))),
        Some(Commands::Doctor) => Ok(finish(&ctx.api.doctor())),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
    }
}

fn init_context() -> Result<(AppContext, CmdResult)> {
    let data_dir = match std::env::var_os(HOME_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => ProjectDirs::from("com", "snipkeep", "snipkeep")
            .ok_or_else(|| SnipError::Store("Could not determine data directory".to_string()))?
            .data_dir()
            .to_path_buf(),
    };

    let config = match SnipConfig::load(&data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring unreadable config: {}", e);
            SnipConfig::default()
        }
    };

    let store = FileStore::new(data_dir.clone());
    let (api, opened) = SnipApi::open(store, config.storage_key.clone());
    Ok((
        AppContext {
            api,
            config,
            data_dir,
        },
        opened,
    ))
}

fn finish(result: &CmdResult) -> bool {
    print_messages(&result.messages);
    !result.has_errors()
}

fn handle_tree(ctx: &AppContext) -> Result<bool> {
    if let Some(root) = ctx.api.folder_tree() {
        print_tree(&root, &ctx.api.library().selected_folder_id, 0);
    }
    Ok(true)
}

fn handle_list(ctx: &AppContext, folder: Option<String>) -> Result<bool> {
    let folder_id = match folder {
        Some(reference) => ctx.api.resolve_folder(&reference)?,
        None => ctx.api.library().selected_folder_id.clone(),
    };
    let path = ctx.api.folder_path(&folder_id)?;
    println!("{}", path.join(" / ").bold());

    let snippets = ctx.api.snippets_in(&folder_id)?;
    let selected = ctx.api.library().selected_snippet_id.as_deref();
    print_snippets(&snippets, selected);
    Ok(true)
}

fn handle_show(ctx: &AppContext, snippet: Option<String>) -> Result<bool> {
    let snippet_id = match snippet {
        Some(reference) => ctx.api.resolve_snippet(&reference)?,
        None => match &ctx.api.library().selected_snippet_id {
            Some(id) => id.clone(),
            None => {
                println!("{}", "No snippet selected.".dimmed());
                return Ok(true);
            }
        },
    };
    let snippet = ctx
        .api
        .library()
        .snippet(&snippet_id)
        .ok_or_else(|| SnipError::SnippetNotFound(snippet_id.clone()))?;
    println!("{}", display_title(snippet).bold());
    println!("--------------------------------");
    println!("{}", snippet.content);
    Ok(true)
}

fn handle_select(ctx: &mut AppContext, reference: &str) -> Result<bool> {
    if let Ok(folder_id) = ctx.api.resolve_folder(reference) {
        return Ok(finish(&ctx.api.select_folder(&folder_id)));
    }
    let snippet_id = ctx.api.resolve_snippet(reference)?;
    Ok(finish(&ctx.api.select_snippet(&snippet_id)))
}

fn handle_folder(ctx: &mut AppContext, cmd: FolderCommands) -> Result<bool> {
    match cmd {
        FolderCommands::New { name, parent } => {
            let parent = parent.map(|p| ctx.api.resolve_folder(&p)).transpose()?;
            let result = ctx.api.create_folder(parent.as_deref(), &name);
            print_ids(&result.affected_folders);
            Ok(finish(&result))
        }
        FolderCommands::Rename { id, name } => {
            let id = ctx.api.resolve_folder(&id)?;
            Ok(finish(&ctx.api.rename_folder(&id, &name)))
        }
        FolderCommands::Delete { id, yes } => {
            let id = ctx.api.resolve_folder(&id)?;
            if !yes && !ctx.api.library().is_root(&id) {
                let summary = ctx.api.delete_summary(&id)?;
                if !confirm(&summary.prompt())? {
                    println!("{}", "Cancelled.".dimmed());
                    return Ok(true);
                }
            }
            Ok(finish(&ctx.api.delete_folder(&id)))
        }
        FolderCommands::Move { id, parent } => {
            let id = ctx.api.resolve_folder(&id)?;
            let parent = ctx.api.resolve_folder(&parent)?;
            Ok(finish(&ctx.api.move_folder(&id, &parent)))
        }
    }
}

fn handle_new(ctx: &mut AppContext, folder: Option<String>) -> Result<bool> {
    let folder = folder.map(|f| ctx.api.resolve_folder(&f)).transpose()?;
    let result = ctx.api.create_snippet(folder.as_deref());
    print_ids(&result.affected_snippets);
    Ok(finish(&result))
}

fn handle_save(
    ctx: &mut AppContext,
    reference: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<bool> {
    let id = ctx.api.resolve_snippet(reference)?;
    let current = ctx
        .api
        .library()
        .snippet(&id)
        .ok_or_else(|| SnipError::SnippetNotFound(id.clone()))?;
    let title = title.unwrap_or_else(|| current.title.clone());
    let content = match content {
        Some(content) => content,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map_err(SnipError::Io)?;
            buf
        }
    };
    Ok(finish(&ctx.api.save_snippet(&id, &title, &content)))
}

fn handle_delete(ctx: &mut AppContext, reference: &str, yes: bool) -> Result<bool> {
    let id = ctx.api.resolve_snippet(reference)?;
    if !yes {
        let snippet = ctx
            .api
            .library()
            .snippet(&id)
            .ok_or_else(|| SnipError::SnippetNotFound(id.clone()))?;
        let prompt = format!(
            "Delete snippet \"{}\"? This cannot be undone.",
            display_title(snippet)
        );
        if !confirm(&prompt)? {
            println!("{}", "Cancelled.".dimmed());
            return Ok(true);
        }
    }
    Ok(finish(&ctx.api.delete_snippet(&id)))
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<bool> {
    match (key, value) {
        (None, _) => {
            for key in SnipConfig::keys() {
                println!("{} = {}", key, ctx.config.get(key).unwrap_or_default());
            }
        }
        (Some(key), None) => match ctx.config.get(&key) {
            Some(value) => println!("{} = {}", key, value),
            None => return Err(SnipError::Api(format!("Unknown config key: {}", key))),
        },
        (Some(key), Some(value)) => {
            ctx.config.set(&key, &value)?;
            ctx.config.save(&ctx.data_dir)?;
            print_messages(&[CmdMessage::success(format!("{} = {}", key, value.trim()))]);
        }
    }
    Ok(true)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().map_err(SnipError::Io)?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(SnipError::Io)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

fn print_ids(ids: &[String]) {
    for id in ids {
        println!("{}", id);
    }
}

fn print_tree(node: &FolderNode, selected: &str, depth: usize) {
    let marker = if node.id == selected { "*" } else { " " };
    let line = format!(
        "{}{} {} ({})",
        "  ".repeat(depth),
        marker,
        node.name,
        node.snippet_count
    );
    let short_id = short_id(&node.id);
    if node.id == selected {
        println!("{}  {}", line.bold(), short_id.dimmed());
    } else {
        println!("{}  {}", line, short_id.dimmed());
    }
    for child in &node.children {
        print_tree(child, selected, depth + 1);
    }
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 24;
const ID_WIDTH: usize = 10;

fn print_snippets(snippets: &[&Snippet], selected: Option<&str>) {
    if snippets.is_empty() {
        println!("{}", "No snippets yet. Create one to get started.".dimmed());
        return;
    }

    for snippet in snippets {
        let is_selected = selected == Some(snippet.id.as_str());
        let marker = if is_selected { "* " } else { "  " };
        let short_id = format!("{:<width$}", short_id(&snippet.id), width = ID_WIDTH);

        let available = LINE_WIDTH.saturating_sub(marker.width() + ID_WIDTH + TIME_WIDTH);
        let title = truncate_to_width(display_title(snippet), available);
        let padding = available.saturating_sub(title.width());
        let updated = format!("{:>width$}", format_updated(snippet), width = TIME_WIDTH);

        let title = if is_selected {
            title.bold()
        } else {
            title.normal()
        };
        println!(
            "{}{}{}{}{}",
            marker,
            short_id.yellow(),
            title,
            " ".repeat(padding),
            updated.dimmed()
        );
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn display_title(snippet: &Snippet) -> &str {
    if snippet.title.is_empty() {
        UNTITLED_SNIPPET_TITLE
    } else {
        &snippet.title
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_updated(snippet: &Snippet) -> String {
    let raw = snippet
        .updated_at
        .as_deref()
        .or(snippet.created_at.as_deref());
    match raw.and_then(parse_timestamp) {
        Some(at) => {
            let duration = Utc::now().signed_duration_since(at);
            let formatter = timeago::Formatter::new();
            format!(
                "Updated {}",
                formatter.convert(duration.to_std().unwrap_or_default())
            )
        }
        None => String::new(),
    }
}
