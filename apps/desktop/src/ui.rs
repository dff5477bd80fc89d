//! Text rendering and command parsing for the terminal painter.

use anyhow::{bail, Context, Result};
use client_core::{ClientEvent, GridModel, IconRegistry};
use shared::domain::PIXEL_OFF;

pub const HELP: &str = "\
commands:
  toggle X Y     flip one pixel
  clear | fill   blank or light the whole matrix
  name TEXT      type into the icon name field
  save [NAME]    save the current frame (defaults to the name field)
  load NAME      show a saved icon on the matrix
  delete NAME    remove a saved icon
  show | icons   print the grid or the icon list
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle { x: usize, y: usize },
    Clear,
    Fill,
    Name(String),
    Save(Option<String>),
    Load(String),
    Delete(String),
    Show,
    Icons,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim_start();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (line, ""),
    };
    let named = |what: &str| -> Result<String> {
        let name = rest.trim();
        if name.is_empty() {
            bail!("{what} needs an icon name");
        }
        Ok(name.to_string())
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "toggle" | "t" => {
            let mut coords = rest.split_whitespace();
            let (Some(x), Some(y), None) = (coords.next(), coords.next(), coords.next()) else {
                bail!("usage: toggle X Y");
            };
            Command::Toggle {
                x: x.parse().with_context(|| format!("invalid x '{x}'"))?,
                y: y.parse().with_context(|| format!("invalid y '{y}'"))?,
            }
        }
        "clear" => Command::Clear,
        "fill" => Command::Fill,
        "name" => Command::Name(rest.to_string()),
        "save" => {
            let name = rest.trim();
            Command::Save((!name.is_empty()).then(|| name.to_string()))
        }
        "load" => Command::Load(named("load")?),
        "delete" | "rm" => Command::Delete(named("delete")?),
        "show" => Command::Show,
        "icons" | "ls" => Command::Icons,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "" => bail!("empty command"),
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(command)
}

pub fn render_grid(grid: &GridModel) -> String {
    grid.cells()
        .chunks(grid.width())
        .map(|row| {
            row.iter()
                .map(|cell| if *cell == PIXEL_OFF { '.' } else { '#' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_icons(icons: &IconRegistry) -> String {
    if icons.items().is_empty() {
        return "(no icons)".to_string();
    }
    icons
        .items()
        .iter()
        .enumerate()
        .map(|(i, icon)| {
            let lit = icon.frame.iter().filter(|p| **p != PIXEL_OFF).count();
            format!("{:>3}. {}  ({lit} lit)", i + 1, icon.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line description of a notification, or `None` if it only needs a
/// redraw.
pub fn describe_event(event: &ClientEvent) -> Option<String> {
    match event {
        ClientEvent::GridResized(size) => Some(format!("grid is now {}x{}", size.width, size.height)),
        ClientEvent::GridRedrawn => None,
        ClientEvent::IconsUpdated { count } => Some(format!("{count} icon(s) saved")),
        ClientEvent::IconNameError(Some(message)) => Some(format!("error: {message}")),
        ClientEvent::IconNameError(None) => None,
        ClientEvent::FocusIconName => Some("edit the name and save again".to_string()),
        ClientEvent::ConnectionChanged(status) => Some(format!("[{}]", status.label())),
    }
}
