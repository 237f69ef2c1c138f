use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config, DEFAULT_LOCK_OFFSET};
use crate::model::MAX_POSITION;
use crate::scoring::LeagueConfig;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Parse "1, 10" or "1 10" into required positions.
fn parse_positions(s: &str) -> Result<Vec<u8>, String> {
    let positions: Vec<u8> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u8>()
                .map_err(|_| format!("'{}' is not a position", part))
        })
        .collect::<Result<_, _>>()?;

    match positions.as_slice() {
        [] => return Err("at least one position is required".to_string()),
        [_] | [_, _] => {}
        _ => return Err("at most two positions per league".to_string()),
    }
    if let Some(p) = positions.iter().find(|p| **p == 0 || **p > MAX_POSITION) {
        return Err(format!("{} is not a grid position (1-{})", p, MAX_POSITION));
    }
    if positions.len() == 2 && positions[0] == positions[1] {
        return Err("positions must differ".to_string());
    }
    Ok(positions)
}

/// Serialize a config to YAML and write it atomically, creating parent dirs.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Write the default config without asking anything. Refuses to overwrite
/// an existing file unless `force` is set.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite",
            config_path.display()
        );
    }
    write_config(&config_path, &Config::default())?;
    Ok(config_path)
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("F1 Picks Configuration");
    println!("======================");
    println!();

    // 1. Lock offset
    println!("Predictions lock a fixed time before qualifying starts (e.g. '1h', '30m').");
    let lock_offset = loop {
        let input = prompt_with_default("Lock offset", DEFAULT_LOCK_OFFSET)?;
        match humantime::parse_duration(&input) {
            Ok(_) => break input,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    // 2. Leagues (at least one required)
    println!();
    println!("Each league asks its members to predict one or two finishing positions.");
    let mut leagues: Vec<LeagueConfig> = Vec::new();
    loop {
        let id = loop {
            let id = prompt("League id: ")?;
            if id.is_empty() {
                println!("  League id is required.");
            } else if leagues.iter().any(|l| l.id == id) {
                println!("  League '{}' already exists.", id);
            } else {
                break id;
            }
        };
        let name = prompt_with_default("Display name", &id)?;

        let required_positions = loop {
            let input = prompt_with_default("Required positions", "1, 10")?;
            match parse_positions(&input) {
                Ok(positions) => break positions,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };

        let members_input = prompt("Members (comma separated, optional): ")?;
        let members = members_input
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from)
            .collect();

        leagues.push(LeagueConfig {
            name: (name != id).then_some(name),
            id,
            required_positions,
            members,
        });

        if !prompt_yes_no("Add another league?", false)? {
            break;
        }
        println!();
    }

    // 3. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        season: None,
        lock_offset: Some(lock_offset),
        leagues,
        calendar: Vec::new(),
    };
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Add a `calendar` section with qualifying times to enable lock checks.");

    Ok(())
}
