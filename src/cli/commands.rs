use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use colored::Colorize;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::NodeStore;
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{DisplayConfig, Settings};
use crate::domain::{tokenize_tags, NodeHandle};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::outline::read_outline;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    if !settings.display.color {
        colored::control::set_override(false);
    }
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Tree { outline }) => _tree(&container, outline),
        Some(Commands::Check { outline }) => _check(&container, outline),
        Some(Commands::Tags { outline }) => _tags(&container, outline),
        Some(Commands::Summary { outline }) => _summary(&container, outline),
        Some(Commands::Find { outline, id, name }) => {
            _find(&container, outline, *id, name.as_deref())
        }
        Some(Commands::Bookmarks { outline }) => _bookmarks(&container, outline),
        Some(Commands::Config) => _config(&container),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn load(container: &ServiceContainer, path: &Path) -> CliResult<NodeStore> {
    let outline = read_outline(path)?;
    Ok(container.load_store(outline)?)
}

fn node_label(store: &NodeStore, handle: NodeHandle, display: &DisplayConfig) -> String {
    let Ok(data) = store.get_node_data(handle, false) else {
        return format!("{}", "<dangling alias>".red());
    };
    let mut label = if data.is_bold {
        data.name.bold().to_string()
    } else {
        data.name.clone()
    };
    if display.show_ids {
        label.push_str(&format!(" [{}]", data.id).dimmed().to_string());
    }
    if data.is_shared() {
        label.push_str(&format!(" -> {}", data.shared_master_id).cyan().to_string());
    }
    if store.is_node_bookmarked(data.id) {
        label.push_str(&" *".yellow().to_string());
    }
    if store.is_excluded(handle).unwrap_or(false) {
        label.push_str(&" (excluded)".dimmed().to_string());
    }
    if !data.tags.is_empty() {
        let tags: Vec<&str> = tokenize_tags(&data.tags).collect();
        label.push_str(&format!(" #{}", tags.join(" #")));
    }
    label
}

fn build_tree(store: &NodeStore, handle: NodeHandle, display: &DisplayConfig) -> Tree<String> {
    let mut tree = Tree::new(node_label(store, handle, display));
    let mut child = store.first_child(handle);
    while let Some(c) = child {
        tree.push(build_tree(store, c, display));
        child = store.next_sibling(c);
    }
    tree
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, outline: &Path) -> CliResult<()> {
    let store = load(container, outline)?;
    let mut tree = Tree::new(outline.display().to_string());
    for root in store.roots() {
        tree.push(build_tree(&store, root, &container.settings.display));
    }
    print!("{}", tree);
    Ok(())
}

#[instrument(skip(container))]
fn _check(container: &ServiceContainer, outline: &Path) -> CliResult<()> {
    let parsed = read_outline(outline)?;
    let mut store = container.store();
    if let Err(e) = store.load(parsed.nodes, parsed.bookmarks) {
        debug!(%e, "load rejected, listing all issues");
    }

    if !store.sequences_are_contiguous(None) {
        output::warning("top-level sequences are not contiguous");
    }
    for (handle, record) in store.iter() {
        if !store.sequences_are_contiguous(Some(handle)) {
            output::warning(&format!("children of {} are not contiguous", record));
        }
    }

    let issues = store.integrity_issues();
    if issues.is_empty() {
        output::success(&format!("{} nodes, no integrity issues", store.len()));
        return Ok(());
    }
    output::header("Integrity issues");
    for issue in &issues {
        output::failure(issue);
    }
    Err(CliError::Integrity(issues.len()))
}

#[instrument(skip(container))]
fn _tags(container: &ServiceContainer, outline: &Path) -> CliResult<()> {
    let store = load(container, outline)?;
    for tag in store.used_tags() {
        output::info(tag);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _summary(container: &ServiceContainer, outline: &Path) -> CliResult<()> {
    let store = load(container, outline)?;
    let info = store.summary_info();
    output::header(&format!("{} nodes, depth {}", info.total_nodes(), store.depth()));
    output::action("rich text", &info.nodes_rich_text);
    output::action("plain text", &info.nodes_plain_text);
    output::action("code", &info.nodes_code);
    output::action("shared", &info.nodes_shared);
    output::action("images", &info.images);
    output::action("embedded files", &info.embedded_files);
    output::action("tables", &info.tables);
    output::action("codeboxes", &info.codeboxes);
    output::action("anchors", &info.anchors);
    output::action("latex", &info.latexes);
    output::action("bookmarks", &store.bookmarks().len());
    output::action("tags", &store.used_tags().len());
    Ok(())
}

#[instrument(skip(container))]
fn _find(
    container: &ServiceContainer,
    outline: &Path,
    id: Option<i64>,
    name: Option<&str>,
) -> CliResult<()> {
    let store = load(container, outline)?;
    let found = match (id, name) {
        (Some(id), _) => store.get_node_from_node_id(id),
        (None, Some(name)) => store.get_node_from_node_name(name),
        (None, None) => return Err(CliError::Usage("give --id or --name".to_string())),
    };
    let Some(handle) = found else {
        output::warning("no matching node");
        return Ok(());
    };

    let data = store.get_node_data(handle, false)?;
    output::header(&data.name);
    output::action("id", &data.id);
    output::action("data holder", &store.get_node_id_data_holder(handle)?);
    output::action("sequence", &data.sequence);
    let path = store.node_path_ids(handle).unwrap_or_default();
    output::action(
        "path",
        &path.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" / "),
    );
    output::action("children", &format!("{:?}", store.get_children_node_ids(handle)?));
    output::action("excluded", &store.is_excluded(handle)?);
    Ok(())
}

#[instrument(skip(container))]
fn _bookmarks(container: &ServiceContainer, outline: &Path) -> CliResult<()> {
    let store = load(container, outline)?;
    for &id in store.bookmarks() {
        let name = store.get_node_name_from_node_id(id).unwrap_or_default();
        output::detail(&format!("{} [{}]", name, id));
    }
    Ok(())
}

fn _config(container: &ServiceContainer) -> CliResult<()> {
    output::info(&container.settings.to_toml()?);
    Ok(())
}
