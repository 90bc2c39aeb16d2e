use std::fs::OpenOptions;
use std::io;

use anyhow::Result;
use chat_client::application::cli;
use chat_client::application::cli::CliCommand;
use chat_client::configuration::{Config, ConfigKey};
use chat_client::{start_loop, ChatClientManager, ReplProps};
use log::LevelFilter;

fn init_logger(log_level: &str) -> Result<()> {
    let log_level_filter = log_level.parse().unwrap_or(LevelFilter::Info);
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level_filter).parse_default_env();

    // Streamed answers go to stdout, so logs never do.
    let log_file = Config::get(ConfigKey::LogFile);
    if log_file.is_empty() {
        builder.target(env_logger::Target::Stderr);
    } else {
        let file = OpenOptions::new().create(true).append(true).open(&log_file)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    return Ok(());
}

#[tokio::main]
async fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let matches = cli::build().get_matches();

    let command = cli::parse(&matches).await?;
    let (question, output, health_check) = match command {
        CliCommand::PrintDefaultConfig => {
            println!("{}", Config::serialize_default(cli::build()));
            return Ok(());
        }
        CliCommand::PrintConfigPath => {
            println!("{}", Config::default(ConfigKey::ConfigFile));
            return Ok(());
        }
        CliCommand::Chat {
            question,
            output,
            health_check,
        } => (question, output, health_check),
    };

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    init_logger(log_level)?;

    log::info!(
        "Connecting to {} ({} framing)",
        Config::get(ConfigKey::ServerUrl),
        Config::get(ConfigKey::Framing)
    );

    let chat_client = ChatClientManager::from_config()?;
    let props = ReplProps {
        chat_client,
        question,
        output,
        health_check,
    };

    let mut stdout = io::stdout();
    return start_loop(props, &mut stdout).await;
}
