//! Command dispatch: loads settings, runs services, prints results

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{GenerationService, QueryService};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{QueryNode, SizeRange};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    // completions do not depend on any configuration
    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let dir = resolve_dir(cli.project_dir.as_deref())?;
    let settings = Arc::new(Settings::load(Some(&dir))?);
    debug!(?settings, "settings loaded");

    match command {
        Commands::Generate { range } => cmd_generate(&settings, range, cli.format),
        Commands::Expand {
            generations,
            queries,
        } => cmd_expand(&settings, *generations, queries, cli.format),
        Commands::Tokenize { text, stdin } => cmd_tokenize(&settings, text.as_deref(), *stdin),
        Commands::Decode { query } => cmd_decode(&settings, query, cli.format),
        Commands::Size { queries } => cmd_size(&settings, queries),
        Commands::Config { command } => cmd_config(&settings, &dir, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn resolve_dir(project_dir: Option<&Path>) -> CliResult<PathBuf> {
    match project_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().map_err(|e| CliError::io("current directory", e)),
    }
}

fn print_trees(trees: &[QueryNode], format: OutputFormat) {
    for tree in trees {
        print_tree(tree, format);
    }
}

fn print_tree(tree: &QueryNode, format: OutputFormat) {
    match format {
        OutputFormat::Tree => output::info(tree.to_tree_string().to_string().trim_end()),
        OutputFormat::Compact => output::info(tree),
    }
}

#[instrument(level = "debug", skip(settings))]
fn cmd_generate(settings: &Arc<Settings>, range: &str, format: OutputFormat) -> CliResult<()> {
    let range: SizeRange = range
        .parse()
        .map_err(|e| CliError::InvalidArgs(format!("{e}")))?;

    let trees = GenerationService::new(Arc::clone(settings)).generate(range)?;

    print_trees(&trees, format);
    output::header(&format!("{} trees of size {}", trees.len(), range));
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_expand(
    settings: &Arc<Settings>,
    generations: i64,
    queries: &[String],
    format: OutputFormat,
) -> CliResult<()> {
    let seeds = if queries.is_empty() {
        vec![QueryNode::leaf()]
    } else {
        QueryService::new(Arc::clone(settings)).decode_all(queries)?
    };

    let trees = GenerationService::new(Arc::clone(settings)).expand(generations, seeds)?;

    if trees.is_empty() {
        output::warning("no trees left after expansion");
        return Ok(());
    }
    print_trees(&trees, format);
    output::header(&format!("{} trees after {} generations", trees.len(), generations));
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_tokenize(settings: &Arc<Settings>, text: Option<&str>, stdin: bool) -> CliResult<()> {
    let service = QueryService::new(Arc::clone(settings));

    if stdin {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| CliError::io("read stdin", e))?;
        for term in service.tokenize_bytes(trim_line_ending(&bytes))? {
            output::info(term);
        }
        return Ok(());
    }

    let text = text.ok_or_else(|| {
        CliError::InvalidArgs("provide query text or --stdin".to_string())
    })?;
    for term in service.tokenize(text)? {
        output::info(term);
    }
    Ok(())
}

/// Drops one trailing `\n` or `\r\n`; the line ending belongs to the terminal.
fn trim_line_ending(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_suffix(b"\r\n")
        .or_else(|| bytes.strip_suffix(b"\n"))
        .unwrap_or(bytes)
}

#[instrument(level = "debug", skip(settings))]
fn cmd_decode(settings: &Arc<Settings>, query: &str, format: OutputFormat) -> CliResult<()> {
    let tree = QueryService::new(Arc::clone(settings)).decode(query)?;
    print_tree(&tree, format);
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_size(settings: &Arc<Settings>, queries: &[String]) -> CliResult<()> {
    let trees = QueryService::new(Arc::clone(settings)).decode_all(queries)?;

    for (query, tree) in queries.iter().zip(&trees) {
        output::field(&tree.size().to_string(), query);
    }
    let (min, max) = GenerationService::new(Arc::clone(settings)).size_range(&trees)?;
    output::header(&format!("size range: ({min}, {max})"));
    Ok(())
}

fn cmd_config(settings: &Settings, dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(settings.to_toml()?.trim_end());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => print_location("global", &path),
                None => output::warning("no home directory, global config unavailable"),
            }
            print_location("local", &local_config_path(dir));
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(dir)
            };
            init_config(&path)
        }
    }
}

fn print_location(label: &str, path: &Path) {
    output::field(label, &path.display());
    if !path.exists() {
        output::detail("(not present)");
    }
}

fn init_config(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CliError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(path, Settings::template())
        .map_err(|e| CliError::io(format!("write {}", path.display()), e))?;
    output::success(&format!("created {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"a (b c)\n", b"a (b c)")]
    #[case(b"a (b c)\r\n", b"a (b c)")]
    #[case(b"a (b c)", b"a (b c)")]
    #[case(b"a\n\n", b"a\n")]
    #[case(b"a\r", b"a\r")]
    #[case(b"", b"")]
    fn given_stdin_bytes_when_trimming_then_one_line_ending_removed(
        #[case] input: &[u8],
        #[case] expected: &[u8],
    ) {
        assert_eq!(trim_line_ending(input), expected);
    }

    #[test]
    fn given_crlf_input_when_tokenizing_then_last_term_has_no_carriage_return() {
        let service = QueryService::new(Arc::new(Settings::default()));

        let terms = service.tokenize_bytes(trim_line_ending(b"a (b c) d\r\n")).unwrap();

        assert_eq!(terms, vec!["a", "(b c)", "d"]);
    }
}
