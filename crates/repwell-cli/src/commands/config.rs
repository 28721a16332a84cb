use clap::Subcommand;
use repwell_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.duration_secs")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Print the config file path
    Path,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match get(&config, &key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            set(&mut config, &key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn get(config: &Config, key: &str) -> Option<String> {
    match key {
        "timer.enabled" => Some(config.timer.enabled.to_string()),
        "timer.duration_secs" => Some(config.timer.duration_secs.to_string()),
        "voice.enabled" => Some(config.voice.enabled.to_string()),
        "voice.language" => Some(config.voice.language.clone()),
        _ => None,
    }
}

fn set(config: &mut Config, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    match key {
        "timer.enabled" => config.timer.enabled = value.parse()?,
        "timer.duration_secs" => config.timer.duration_secs = value.parse()?,
        "voice.enabled" => config.voice.enabled = value.parse()?,
        "voice.language" => config.voice.language = value.to_string(),
        _ => return Err(format!("unknown key: {key}").into()),
    }
    Ok(())
}
