//! Keybindings configuration for the TUI.

use anyhow::{Context, Result, anyhow, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use todos_app::ClientConfig;
use todos_app::config::DEFAULT_BASE_URL;

macro_rules! vec_of_strings {
    ($($s:expr),* $(,)?) => {
        vec![$($s.to_string()),*]
    };
}

/// The `[tui]` part of the configuration file. Other tables are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// TUI configuration.
    #[serde(default)]
    pub tui: TuiConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Keybindings configuration.
    #[serde(default)]
    pub keybindings: KeyBindingsConfig,
}

/// Keybindings configuration for the TUI.
///
/// Only the item list is configurable; the title editors use fixed keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyBindingsConfig {
    /// Keybindings for the item list.
    #[serde(default)]
    pub item_list: ItemListKeyBindings,
}

/// Keybindings for the item list. Omitted actions keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemListKeyBindings {
    /// Quit the application.
    pub quit: Vec<String>,
    /// Move down in the list.
    pub down: Vec<String>,
    /// Move up in the list.
    pub up: Vec<String>,
    /// Focus the new-item input.
    pub new_item: Vec<String>,
    /// Flip completion of the selected item.
    pub toggle: Vec<String>,
    /// Complete or reopen every item.
    pub toggle_all: Vec<String>,
    /// Rename the selected item.
    pub edit: Vec<String>,
    /// Delete the selected item.
    pub delete: Vec<String>,
    /// Delete every completed item.
    pub clear_completed: Vec<String>,
    /// Cycle through filters.
    pub next_filter: Vec<String>,
    /// Show every item.
    pub show_all: Vec<String>,
    /// Show active items.
    pub show_active: Vec<String>,
    /// Show completed items.
    pub show_completed: Vec<String>,
    /// Hide the error banner.
    pub dismiss_error: Vec<String>,
}

impl Default for ItemListKeyBindings {
    fn default() -> Self {
        Self {
            quit: vec_of_strings!["q", "Ctrl+c"],
            down: vec_of_strings!["j", "Down"],
            up: vec_of_strings!["k", "Up"],
            new_item: vec_of_strings!["n", "i"],
            toggle: vec_of_strings!["Space", "x"],
            toggle_all: vec_of_strings!["a"],
            edit: vec_of_strings!["e", "Enter"],
            delete: vec_of_strings!["d", "Delete"],
            clear_completed: vec_of_strings!["c"],
            next_filter: vec_of_strings!["Tab", "f"],
            show_all: vec_of_strings!["1"],
            show_active: vec_of_strings!["2"],
            show_completed: vec_of_strings!["3"],
            dismiss_error: vec_of_strings!["Esc"],
        }
    }
}

impl ItemListKeyBindings {
    fn bindings(&self) -> [(&'static str, &[String]); 14] {
        [
            ("quit", &self.quit),
            ("down", &self.down),
            ("up", &self.up),
            ("new_item", &self.new_item),
            ("toggle", &self.toggle),
            ("toggle_all", &self.toggle_all),
            ("edit", &self.edit),
            ("delete", &self.delete),
            ("clear_completed", &self.clear_completed),
            ("next_filter", &self.next_filter),
            ("show_all", &self.show_all),
            ("show_active", &self.show_active),
            ("show_completed", &self.show_completed),
            ("dismiss_error", &self.dismiss_error),
        ]
    }
}

/// Generate the configuration template written by `init-config`.
pub fn generate_default_config_toml() -> Result<String> {
    let defaults = ClientConfig::default();
    let keybindings =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default keybindings")?;

    let header = r#"# todos Configuration
#
# [client]
# base_url            Server hosting the /todos collection (env: TODOS_BASE_URL).
# owner_id            Owner every request is scoped to (env: TODOS_OWNER_ID).
#                     The client refuses to start without one.
# request_timeout_ms  Per-request timeout. Requests never time out when unset.
# error_dwell_ms      How long error banners stay visible.
# toggle_all_policy   "per-item" keeps every item that succeeded,
#                     "fail-fast" stops at the first failure and reloads.
#
# [tui.keybindings.item_list]
# Each action can have multiple key bindings. Omitted actions keep their defaults.
#
# Supported key formats:
# - Single characters: "j", "k", "a", "1"
# - Special keys: "Enter", "Esc", "Tab", "Space", "Backspace", "Delete"
# - Arrow keys: "Up", "Down", "Left", "Right"
# - Navigation keys: "Home", "End", "PageUp", "PageDown"
# - Modified keys: "Ctrl+c", "Alt+k", "Shift+Up"

"#;

    Ok(format!(
        "{header}[client]\nbase_url = \"{DEFAULT_BASE_URL}\"\n# owner_id = 1\n# request_timeout_ms = 10000\nerror_dwell_ms = {}\ntoggle_all_policy = \"{}\"\n\n{keybindings}",
        defaults.error_dwell_ms,
        defaults.toggle_all_policy.as_str(),
    ))
}

/// Load configuration from a TOML file.
///
/// # Returns
/// - `Ok(Some(config))` if the file exists and was successfully parsed
/// - `Ok(None)` if the file does not exist or no path could be determined
/// - `Err(_)` if there was an error reading or parsing the file
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => match ClientConfig::default_path() {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Parse a key string into a `KeyEvent`.
///
/// # Examples
/// - "j" -> `KeyCode::Char('j')`
/// - "Space" -> `KeyCode::Char(' ')`
/// - "Ctrl+c" -> `KeyCode::Char('c')` with CONTROL modifier
pub fn parse_key(s: &str) -> Result<KeyEvent> {
    let parts: Vec<&str> = s.split('+').collect();
    let Some((key_part, modifier_parts)) = parts.split_last() else {
        bail!("Empty key string");
    };

    let mut modifiers = KeyModifiers::NONE;
    for &modifier in modifier_parts {
        match modifier {
            "Ctrl" | "Control" => modifiers |= KeyModifiers::CONTROL,
            "Alt" => modifiers |= KeyModifiers::ALT,
            "Shift" => modifiers |= KeyModifiers::SHIFT,
            other => bail!("Unknown modifier: {other}"),
        }
    }

    let code = parse_key_code(key_part)?;
    Ok(KeyEvent::new(code, modifiers))
}

fn parse_key_code(s: &str) -> Result<KeyCode> {
    match s {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" => Ok(KeyCode::Esc),
        "Space" => Ok(KeyCode::Char(' ')),
        "Backspace" => Ok(KeyCode::Backspace),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Tab" => Ok(KeyCode::Tab),
        "Delete" => Ok(KeyCode::Delete),
        "Insert" => Ok(KeyCode::Insert),
        s if s.chars().count() == 1 => {
            let ch = s.chars().next().ok_or_else(|| anyhow!("Empty char"))?;
            Ok(KeyCode::Char(ch))
        }
        other => bail!("Unknown key: {other}"),
    }
}

/// Validate the keybindings configuration.
///
/// Checks for:
/// - Empty key bindings
/// - Invalid key expressions
/// - Keys bound to more than one action
pub fn validate_keybindings_config(config: &KeyBindingsConfig) -> Result<()> {
    let bindings = config.item_list.bindings();

    for (name, keys) in bindings {
        if keys.is_empty() {
            bail!("item_list.{name} must have at least one key binding");
        }
        for key in keys {
            parse_key(key).with_context(|| format!("Invalid key '{key}' in item_list.{name}"))?;
        }
    }

    let mut key_to_actions: HashMap<&str, Vec<&str>> = HashMap::new();
    for (name, keys) in bindings {
        for key in keys {
            key_to_actions.entry(key.as_str()).or_default().push(name);
        }
    }
    let mut conflicts: Vec<_> = key_to_actions
        .into_iter()
        .filter(|(_, actions)| actions.len() > 1)
        .collect();
    conflicts.sort_unstable();
    if let Some((key, actions)) = conflicts.first() {
        bail!("Key '{key}' is bound to multiple actions in item_list: {actions:?}");
    }

    Ok(())
}

/// Action that can be performed on the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit.
    Quit,
    /// Move down.
    Down,
    /// Move up.
    Up,
    /// Focus the new-item input.
    NewItem,
    /// Toggle the selected item.
    Toggle,
    /// Toggle every item.
    ToggleAll,
    /// Rename the selected item.
    Edit,
    /// Delete the selected item.
    Delete,
    /// Delete completed items.
    ClearCompleted,
    /// Cycle filters.
    NextFilter,
    /// Show every item.
    ShowAll,
    /// Show active items.
    ShowActive,
    /// Show completed items.
    ShowCompleted,
    /// Hide the error banner.
    DismissError,
}

impl KeyBindingsConfig {
    /// Help line for the item list.
    pub fn generate_help_text(&self) -> String {
        let list = &self.item_list;
        format!(
            "{}:move {}:new {}:toggle {}:toggle all {}:rename {}:delete {}:clear completed {}:filter {}:quit",
            Self::format_key_pair(&list.down, &list.up),
            Self::format_first_key(&list.new_item),
            Self::format_first_key(&list.toggle),
            Self::format_first_key(&list.toggle_all),
            Self::format_first_key(&list.edit),
            Self::format_first_key(&list.delete),
            Self::format_first_key(&list.clear_completed),
            Self::format_first_key(&list.next_filter),
            Self::format_first_key(&list.quit),
        )
    }

    fn format_first_key(keys: &[String]) -> String {
        keys.first()
            .map_or_else(|| "?".to_string(), |k| Self::format_key_display(k))
    }

    fn format_key_pair(down: &[String], up: &[String]) -> String {
        format!("{}/{}", Self::format_first_key(down), Self::format_first_key(up))
    }

    fn format_key_display(key: &str) -> String {
        match key {
            "Enter" => "↵".to_string(),
            "Space" => "␣".to_string(),
            "Backspace" => "BS".to_string(),
            "Delete" => "Del".to_string(),
            "Up" => "↑".to_string(),
            "Down" => "↓".to_string(),
            "Left" => "←".to_string(),
            "Right" => "→".to_string(),
            "PageUp" => "PgUp".to_string(),
            "PageDown" => "PgDn".to_string(),
            other if other.starts_with("Ctrl+") || other.starts_with("Alt+") => other.replace('+', "-"),
            other => other.to_string(),
        }
    }

    /// Check if a key event matches a configured action.
    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.get_keys(action)
            .iter()
            .filter_map(|key_str| parse_key(key_str).ok())
            .any(|expected| Self::key_event_matches(&expected, key))
    }

    fn key_event_matches(expected: &KeyEvent, actual: &KeyEvent) -> bool {
        if expected.code != actual.code {
            return false;
        }
        // Terminals report SHIFT alongside upper-case characters.
        let ignore_shift = matches!(expected.code, KeyCode::Char(ch) if !ch.is_ascii_lowercase());
        if ignore_shift {
            expected.modifiers.difference(KeyModifiers::SHIFT) == actual.modifiers.difference(KeyModifiers::SHIFT)
        } else {
            expected.modifiers == actual.modifiers
        }
    }

    const fn get_keys(&self, action: Action) -> &Vec<String> {
        let list = &self.item_list;
        match action {
            Action::Quit => &list.quit,
            Action::Down => &list.down,
            Action::Up => &list.up,
            Action::NewItem => &list.new_item,
            Action::Toggle => &list.toggle,
            Action::ToggleAll => &list.toggle_all,
            Action::Edit => &list.edit,
            Action::Delete => &list.delete,
            Action::ClearCompleted => &list.clear_completed,
            Action::NextFilter => &list.next_filter,
            Action::ShowAll => &list.show_all,
            Action::ShowActive => &list.show_active,
            Action::ShowCompleted => &list.show_completed,
            Action::DismissError => &list.dismiss_error,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_keybindings() {
        let config = KeyBindingsConfig::default();

        assert_eq!(config.item_list.quit, vec!["q", "Ctrl+c"]);
        assert_eq!(config.item_list.toggle, vec!["Space", "x"]);
        assert_eq!(config.item_list.edit, vec!["e", "Enter"]);
        assert_eq!(config.item_list.next_filter, vec!["Tab", "f"]);
        assert_eq!(config.item_list.dismiss_error, vec!["Esc"]);
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_keybindings_config(&KeyBindingsConfig::default()).is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [client]
            owner_id = 1

            [tui.keybindings.item_list]
            quit = ["Q"]
            "#,
        )
        .unwrap();

        assert_eq!(config.tui.keybindings.item_list.quit, vec!["Q"]);
        assert_eq!(config.tui.keybindings.item_list.down, vec!["j", "Down"]);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[tui.keybindings.item_list]\nfly = [\"w\"]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_keys() {
        let key = parse_key("j").unwrap();
        assert_eq!(key.code, KeyCode::Char('j'));
        assert_eq!(key.modifiers, KeyModifiers::NONE);

        let key = parse_key("Space").unwrap();
        assert_eq!(key.code, KeyCode::Char(' '));

        let key = parse_key("Ctrl+c").unwrap();
        assert_eq!(key.code, KeyCode::Char('c'));
        assert_eq!(key.modifiers, KeyModifiers::CONTROL);

        let key = parse_key("Shift+Up").unwrap();
        assert_eq!(key.code, KeyCode::Up);
        assert_eq!(key.modifiers, KeyModifiers::SHIFT);
    }

    #[test]
    fn test_parse_invalid_key() {
        assert!(parse_key("InvalidKey").is_err());
        assert!(parse_key("").is_err());
        assert!(parse_key("Hyper+j").is_err());
    }

    #[test]
    fn test_matches() {
        let config = KeyBindingsConfig::default();

        assert!(config.matches(Action::Toggle, &KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert!(config.matches(Action::Quit, &KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!config.matches(Action::Quit, &KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(config.matches(Action::ClearCompleted, &KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!config.matches(Action::Down, &KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_matches_uppercase_with_shift() {
        let mut config = KeyBindingsConfig::default();
        config.item_list.quit = vec_of_strings!["Q"];

        assert!(config.matches(Action::Quit, &KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
        assert!(config.matches(Action::Quit, &KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_detect_key_conflict() {
        let mut config = KeyBindingsConfig::default();
        config.item_list.delete = vec_of_strings!["x"];

        let err = validate_keybindings_config(&config).unwrap_err();
        assert!(err.to_string().contains("Key 'x' is bound to multiple actions"));
    }

    #[test]
    fn test_empty_binding_validation() {
        let mut config = KeyBindingsConfig::default();
        config.item_list.toggle_all = Vec::new();

        let err = validate_keybindings_config(&config).unwrap_err();
        assert!(err.to_string().contains("item_list.toggle_all"));
    }

    #[test]
    fn test_invalid_key_expression() {
        let mut config = KeyBindingsConfig::default();
        config.item_list.edit = vec_of_strings!["Meta+e"];

        let err = validate_keybindings_config(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid key 'Meta+e' in item_list.edit"));
    }

    #[test]
    fn test_help_text() {
        let help = KeyBindingsConfig::default().generate_help_text();
        assert!(help.starts_with("j/k:move n:new ␣:toggle a:toggle all e:rename"));
        assert!(help.ends_with("Tab:filter q:quit"));
    }

    #[test]
    fn test_generated_template_parses_for_both_layers() {
        let content = generate_default_config_toml().unwrap();

        let client = ClientConfig::from_toml(&content).unwrap();
        assert_eq!(client, ClientConfig::default());

        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.tui.keybindings.item_list.toggle, vec!["Space", "x"]);
        assert!(validate_keybindings_config(&config.tui.keybindings).is_ok());
    }

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(load_config(Some(&path)).unwrap().is_none());

        std::fs::write(&path, "[tui.keybindings.item_list]\nup = [\"Ctrl+p\"]\n").unwrap();
        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.tui.keybindings.item_list.up, vec!["Ctrl+p"]);

        std::fs::write(&path, "[tui.keybindings.item_list\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
