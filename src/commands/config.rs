//! Config command handler.
//!
//! Displays the effective configuration or writes the default file.

use crate::config::{config_path, init_config, load_config, resolve_data_dir, Config};
use crate::error::Result;
use crate::output::{print_info, print_success, BOLD, CYAN, GRAY, RESET, YELLOW};

/// Show the effective configuration, or create the default file with `init`.
pub fn config_command(init: bool) -> Result<()> {
    if init {
        let (path, created) = init_config()?;
        if created {
            print_success(&format!("Created {}", path.display()));
        } else {
            print_info(&format!("{} already exists, left unchanged", path.display()));
        }
        return Ok(());
    }

    let path = config_path()?;
    println!("{BOLD}# rackboard config{RESET}");
    println!("{GRAY}# {}{RESET}", path.display());
    if !path.exists() {
        println!("{YELLOW}# (file does not exist, using defaults){RESET}");
    }
    println!();

    let config = load_config()?;
    print_config_as_toml(&config);
    println!();
    println!(
        "{GRAY}# inventory stored in {}{RESET}",
        resolve_data_dir(&config, None)?.display()
    );
    Ok(())
}

fn print_config_as_toml(config: &Config) {
    for line in config_to_toml_string(config).lines() {
        match line.split_once(" = ") {
            Some((key, value)) => println!("{CYAN}{key}{RESET} = {value}"),
            None => println!("{line}"),
        }
    }
}

/// Render a config in the same shape as the config file.
pub fn config_to_toml_string(config: &Config) -> String {
    let mut out = String::new();
    if let Some(dir) = &config.data_dir {
        out.push_str(&format!("data_dir = {:?}\n", dir.display().to_string()));
    }
    out.push_str(&format!("seed = {}\n", config.seed));
    out.push_str(&format!("notice_ms = {}", config.notice_ms));
    out
}
