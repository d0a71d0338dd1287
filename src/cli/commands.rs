//! Command dispatch

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{OwnerId, SkillView};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `skilltree --help`".into(),
        ));
    };

    // Commands that must work without a loadable configuration
    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        Commands::Config {
            command: ConfigCommands::Path,
        } => return config_path(&project_dir(cli)),
        Commands::Config {
            command: ConfigCommands::Init { global },
        } => return config_init(&project_dir(cli), *global),
        _ => {}
    }

    let settings = Settings::load(Some(&project_dir(cli)))?;
    let container = ServiceContainer::new(settings);
    let owner = container.owner_or_default(cli.owner.as_deref());
    debug!("owner={} store={}", owner, container.tree_store.describe());

    match command {
        Commands::InitUser {
            external_id,
            username,
        } => init_user(&container, *external_id, username.as_deref()),
        Commands::EnsureRoot => ensure_root(&container, &owner),
        Commands::Add { id, name, parent } => add(&container, &owner, id, name, parent.as_deref()),
        Commands::Delete { id } => delete(&container, &owner, id),
        Commands::Train { id } => train(&container, &owner, id),
        Commands::Show { id } => show(&container, &owner, id),
        Commands::List { json, all } => list(&container, &owner, *json, *all),
        Commands::Tree => tree(&container, &owner),
        Commands::Owners => owners(&container),
        Commands::Info => info(&container, &owner),
        Commands::Config {
            command: ConfigCommands::Show,
        } => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}

fn project_dir(cli: &Cli) -> PathBuf {
    cli.project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn to_json(value: &impl serde::Serialize) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ApplicationError::OperationFailed {
            context: "serialize listing".into(),
            source: Box::new(e),
        }
        .into()
    })
}

#[instrument(skip(container))]
fn init_user(container: &ServiceContainer, external_id: i64, username: Option<&str>) -> CliResult<()> {
    let init = container.identity.init_user(external_id, username)?;
    if init.created {
        output::success(&format!("registered user {} as owner {}", external_id, init.owner.id));
    } else {
        output::action("Known user", &format!("{} is owner {}", external_id, init.owner.id));
    }
    if let Some(root) = init.root {
        output::detail(&format!("root '{}' at {}", root.name, root.pos));
    }
    output::info(&format!("user_id={}", init.owner.id));
    Ok(())
}

#[instrument(skip(container))]
fn ensure_root(container: &ServiceContainer, owner: &OwnerId) -> CliResult<()> {
    match container.skills.ensure_owner_root(owner)? {
        Some(root) => output::success(&format!("created root '{}' for {}", root.name, owner)),
        None => output::action("Unchanged", &format!("{} already has a root", owner)),
    }
    Ok(())
}

#[instrument(skip(container))]
fn add(
    container: &ServiceContainer,
    owner: &OwnerId,
    id: &str,
    name: &str,
    parent: Option<&str>,
) -> CliResult<()> {
    let skill = container.skills.add_node(id, name, parent, owner)?;
    if parent.is_some() && skill.parent.is_none() {
        output::warning(&format!(
            "parent '{}' not found for {}, added as root",
            parent.unwrap_or_default(),
            owner
        ));
    }
    output::success(&format!("added '{}' [{}] at {}", skill.name, skill.id, skill.pos));
    Ok(())
}

#[instrument(skip(container))]
fn delete(container: &ServiceContainer, owner: &OwnerId, id: &str) -> CliResult<()> {
    let summary = container.skills.delete_node(owner, id)?;
    output::success(&format!("deleted {} skill(s)", summary.count()));
    for removed in &summary.removed {
        output::removed(removed);
    }
    Ok(())
}

#[instrument(skip(container))]
fn train(container: &ServiceContainer, owner: &OwnerId, id: &str) -> CliResult<()> {
    let skill = container.skills.train(owner, id)?;
    output::success(&format!("'{}' is now level {}", skill.name, skill.level));
    Ok(())
}

#[instrument(skip(container))]
fn show(container: &ServiceContainer, owner: &OwnerId, id: &str) -> CliResult<()> {
    let skill = container.skills.get(owner, id)?;
    let children = container.skills.child_count(owner, id)?;
    output::header(&format!("{} [{}]", skill.name, skill.id));
    output::detail(&format!("owner:    {}", skill.owner));
    output::detail(&format!("level:    {}", skill.level));
    output::detail(&format!("position: {}", skill.pos));
    output::detail(&format!(
        "parent:   {}",
        skill.parent.as_deref().unwrap_or("(root)")
    ));
    output::detail(&format!("children: {}", children));
    Ok(())
}

#[instrument(skip(container))]
fn list(container: &ServiceContainer, owner: &OwnerId, json: bool, all: bool) -> CliResult<()> {
    if all {
        let mut by_owner: BTreeMap<String, BTreeMap<String, SkillView>> = BTreeMap::new();
        for (key, skill) in container.skills.list_nodes(None)? {
            by_owner
                .entry(key.owner.to_string())
                .or_default()
                .insert(key.id, SkillView::from(&skill));
        }
        if json {
            output::info(&to_json(&by_owner)?);
        } else {
            for (owner, skills) in &by_owner {
                output::header(owner);
                print_listing(skills);
            }
        }
        return Ok(());
    }

    let listing = container.skills.listing(owner)?;
    if json {
        output::info(&to_json(&listing)?);
    } else if listing.is_empty() {
        output::warning(&format!("no skills for {}", owner));
    } else {
        print_listing(&listing);
    }
    Ok(())
}

fn print_listing(listing: &BTreeMap<String, SkillView>) {
    for (id, view) in listing {
        output::detail(&format!(
            "{:<16} {:<24} lvl {:>3}  {}  parent={}",
            id,
            view.name,
            view.level,
            view.pos,
            view.parent.as_deref().unwrap_or("-")
        ));
    }
}

#[instrument(skip(container))]
fn tree(container: &ServiceContainer, owner: &OwnerId) -> CliResult<()> {
    let forest = container.skills.forest()?;
    let trees = forest.to_tree_strings(owner);
    if trees.is_empty() {
        output::warning(&format!("no skills for {}", owner));
    }
    for t in trees {
        output::info(&t);
    }
    Ok(())
}

fn owners(container: &ServiceContainer) -> CliResult<()> {
    let owners = container.identity.owners()?;
    output::header(&format!("{} registered user(s)", owners.len()));
    for o in owners {
        output::detail(&format!(
            "{:<6} external={} username={}",
            o.id,
            o.external_id,
            o.username.as_deref().unwrap_or("-")
        ));
    }
    Ok(())
}

fn info(container: &ServiceContainer, owner: &OwnerId) -> CliResult<()> {
    let stats = container.skills.stats(owner)?;
    output::header("skilltree");
    output::detail(&format!("store:  {}", container.tree_store.describe()));
    output::detail(&format!("owner:  {}", owner));
    output::detail(&format!("skills: {}", stats.skills));
    output::detail(&format!("roots:  {}", stats.roots));
    output::detail(&format!("depth:  {}", stats.depth));
    output::detail(&format!("leaves: {}", stats.leaves));
    Ok(())
}

fn config_path(dir: &Path) -> CliResult<()> {
    match global_config_path() {
        Some(p) => output::action("Global", &p.display()),
        None => output::warning("no global config directory on this platform"),
    }
    output::action("Local", &local_config_path(dir).display());
    Ok(())
}

fn config_init(dir: &Path, global: bool) -> CliResult<()> {
    let path = if global {
        global_config_path()
            .ok_or_else(|| CliError::Usage("no global config directory on this platform".into()))?
    } else {
        local_config_path(dir)
    };
    let fs = RealFileSystem;
    if fs.exists(&path) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    fs.ensure_parent(&path)
        .and_then(|_| fs.write(&path, &Settings::template()))
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::success(&format!("created {}", path.display()));
    Ok(())
}
