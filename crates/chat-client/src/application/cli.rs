use std::path::PathBuf;

use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use strum::VariantNames;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Framing;

pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

fn arg_config_file() -> Arg {
    return Arg::new(ConfigKey::ConfigFile.to_string())
        .short('c')
        .long(ConfigKey::ConfigFile.to_string())
        .env("CHAT_CONFIG_FILE")
        .num_args(1)
        .help(format!(
            "Path to configuration file [default: {}]",
            Config::default(ConfigKey::ConfigFile)
        ))
        .global(true);
}

fn arg_server_url() -> Arg {
    return Arg::new(ConfigKey::ServerUrl.to_string())
        .long(ConfigKey::ServerUrl.to_string())
        .env("CHAT_SERVER_URL")
        .num_args(1)
        .help(format!(
            "Base URL of the chat backend. [default: {}]",
            Config::default(ConfigKey::ServerUrl)
        ));
}

fn arg_ws_url() -> Arg {
    return Arg::new(ConfigKey::WsUrl.to_string())
        .long(ConfigKey::WsUrl.to_string())
        .env("CHAT_WS_URL")
        .num_args(1)
        .help(format!(
            "Websocket base URL used by the message framing. [default: {}]",
            Config::default(ConfigKey::WsUrl)
        ));
}

fn arg_framing() -> Arg {
    return Arg::new(ConfigKey::Framing.to_string())
        .short('f')
        .long(ConfigKey::Framing.to_string())
        .env("CHAT_FRAMING")
        .num_args(1)
        .value_parser(PossibleValuesParser::new(Framing::VARIANTS.iter().copied()))
        .help(format!(
            "How the backend frames streamed responses. [default: {}]",
            Config::default(ConfigKey::Framing)
        ));
}

fn arg_auth_token() -> Arg {
    return Arg::new(ConfigKey::AuthToken.to_string())
        .long(ConfigKey::AuthToken.to_string())
        .env("CHAT_AUTH_TOKEN")
        .num_args(1)
        .hide_env_values(true)
        .help("Bearer token sent with every request.");
}

fn arg_request_timeout() -> Arg {
    return Arg::new(ConfigKey::RequestTimeout.to_string())
        .long(ConfigKey::RequestTimeout.to_string())
        .env("CHAT_REQUEST_TIMEOUT")
        .num_args(1)
        .help(format!(
            "Timeout in milliseconds for requests that are not streamed. [default: {}]",
            Config::default(ConfigKey::RequestTimeout)
        ));
}

fn arg_log_file() -> Arg {
    return Arg::new(ConfigKey::LogFile.to_string())
        .long(ConfigKey::LogFile.to_string())
        .env("CHAT_LOG_FILE")
        .num_args(1)
        .help("Write logs to this file instead of stderr.");
}

pub fn build() -> Command {
    return Command::new("chat")
        .about("Chat with a streaming assistant backend from the terminal.")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new("config")
                .about("Configuration file options.")
                .subcommand_required(true)
                .subcommand(
                    Command::new("default").about("Outputs the default configuration file."),
                )
                .subcommand(
                    Command::new("path").about("Returns the default path for the configuration file."),
                ),
        )
        .arg(arg_config_file())
        .arg(arg_server_url())
        .arg(arg_ws_url())
        .arg(arg_framing())
        .arg(arg_auth_token())
        .arg(arg_request_timeout())
        .arg(arg_log_file())
        .arg(
            Arg::new("question")
                .short('q')
                .long("question")
                .num_args(1)
                .help("Ask a single question, print the answer and exit."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .num_args(1)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Write the rendered HTML transcript to this file on exit."),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .env("CHAT_LOG_LEVEL")
                .num_args(1)
                .default_value("info")
                .value_parser(PossibleValuesParser::new(LOG_LEVELS))
                .help("Log level."),
        )
        .arg(
            Arg::new("no-health-check")
                .long("no-health-check")
                .action(ArgAction::SetTrue)
                .help("Skip the backend health check on startup."),
        );
}

/// What the binary should do after argument parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    PrintDefaultConfig,
    PrintConfigPath,
    Chat {
        question: Option<String>,
        output: Option<PathBuf>,
        health_check: bool,
    },
}

/// Resolves configuration from `matches` and returns the command to run.
pub async fn parse(matches: &ArgMatches) -> Result<CliCommand> {
    if let Some(("config", subcmd_matches)) = matches.subcommand() {
        match subcmd_matches.subcommand() {
            Some(("path", _)) => return Ok(CliCommand::PrintConfigPath),
            _ => return Ok(CliCommand::PrintDefaultConfig),
        }
    }

    Config::load(build(), vec![matches]).await?;

    return Ok(CliCommand::Chat {
        question: matches.get_one::<String>("question").cloned(),
        output: matches.get_one::<PathBuf>("output").cloned(),
        health_check: !matches.get_flag("no-health-check"),
    });
}
