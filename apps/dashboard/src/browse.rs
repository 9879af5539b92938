//! Interactive client browser driven by stdin commands.

use anyhow::{Context, Result};
use client_core::ListController;
use shared::domain::SortDirection;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render::client_table;

const HELP: &str = "\
commands:
  search <text>   filter by name (empty text clears the filter)
  sort asc|desc   change name ordering
  next | n        next page
  prev | p        previous page
  page <n>        jump to page n
  refresh         drop cached pages and reload
  help            show this message
  quit | q        exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Sort(SortDirection),
    Next,
    Previous,
    Page(u32),
    Refresh,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let trimmed = line.trim_start();
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));

    match word.to_ascii_lowercase().as_str() {
        "search" | "s" => Ok(BrowseCommand::Search(rest.trim().to_string())),
        "sort" => rest
            .parse::<SortDirection>()
            .map(BrowseCommand::Sort)
            .map_err(|e| e.to_string()),
        "next" | "n" => Ok(BrowseCommand::Next),
        "prev" | "p" => Ok(BrowseCommand::Previous),
        "page" => rest
            .trim()
            .parse::<u32>()
            .map(BrowseCommand::Page)
            .map_err(|_| format!("page expects a number, got '{}'", rest.trim())),
        "refresh" | "r" => Ok(BrowseCommand::Refresh),
        "help" | "?" => Ok(BrowseCommand::Help),
        "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command '{other}', type 'help'")),
    }
}

pub async fn run(mut controller: ListController) -> Result<()> {
    let mut search_rx = controller.search_updates();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    controller.sync().await;
    print!("{}", client_table(&controller.snapshot()));
    println!("{HELP}");

    loop {
        tokio::select! {
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if controller.sync().await {
                    print!("{}", client_table(&controller.snapshot()));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read command from stdin")? else {
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                debug!(?command, "browse command");
                match command {
                    BrowseCommand::Search(text) => {
                        controller.set_search_input(text);
                        continue;
                    }
                    BrowseCommand::Sort(sort) => controller.set_sort(sort).await,
                    BrowseCommand::Next => controller.next_page().await,
                    BrowseCommand::Previous => controller.previous_page().await,
                    BrowseCommand::Page(n) => controller.jump_to(n).await,
                    BrowseCommand::Refresh => {
                        controller.invalidate_cache();
                        controller.refresh().await;
                    }
                    BrowseCommand::Help => {
                        println!("{HELP}");
                        continue;
                    }
                    BrowseCommand::Quit => break,
                }
                print!("{}", client_table(&controller.snapshot()));
            }
        }
    }

    Ok(())
}
