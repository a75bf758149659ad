//! Command-line interface parsing and handling
//!
//! This module parses the command line, loads configuration and logging, and
//! then runs either the interactive session, a one-shot query, or the
//! `config` subcommand.

pub mod oneshot;
pub mod settings;

use std::error::Error;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::core::app::{App, AppAction};
use crate::core::config::{Config, ConfigStore};
use crate::core::providers::builtin::load_builtin_providers;
use crate::core::providers::ProviderRegistry;
use crate::ui::chat_loop::run_chat;
use crate::ui::selector::SelectorKind;
use crate::utils::logging::init_file_logging;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "chait")]
#[command(version = VERSION)]
#[command(about = "A full-screen terminal chat client for OpenAI-compatible APIs")]
#[command(args_conflicts_with_subcommands = true)]
#[command(
    long_about = "chait is a full-screen terminal chat client that streams replies from \
DeepSeek, OpenAI and Grok.\n\n\
API keys:\n\
  Stored in the system keyring after you enter them with ':k', or read from\n\
  DEEPSEEK_API_KEY, OPENAI_API_KEY and XAI_API_KEY.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  PgUp/PgDn/Mouse   Scroll through chat history\n\
  Ctrl+P/Ctrl+T     Select provider / temperature (-p opens the provider\n\
                    selector at start-up)\n\
  Esc or Ctrl+C     Cancel, stop streaming, or quit\n\n\
Commands:\n\
  :h  help   :c  new conversation   :p  provider\n\
  :m  model  :t  temperature        :k  API key"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print the answer to stdout and exit instead of opening the chat screen
    #[arg(short = 'n', long)]
    pub no_interaction: bool,

    /// Open the provider selector when the session starts
    #[arg(short = 'p', long = "provider", conflicts_with = "no_interaction")]
    pub select_provider: bool,

    /// Provider to use for this session without saving the choice
    #[arg(long, value_name = "NAME")]
    pub use_provider: Option<String>,

    /// Model to use for this session
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Prompt to send; piped stdin is appended to it
    #[arg(value_name = "PROMPT", trailing_var_arg = true)]
    pub prompt: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or change persisted settings
    Config {
        /// Print the current configuration
        #[arg(long)]
        show: bool,
        /// Setting to change, e.g. `provider` or `providers.openai.model`
        key: Option<String>,
        /// New value for the setting
        value: Option<String>,
    },
}

pub async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };

    if let Some(Commands::Config { show, key, value }) = args.command.take() {
        return settings::run_config_command(&config_path, show, key, value);
    }

    let config = Config::load_from_path(&config_path)?;

    let log_path = args
        .log
        .clone()
        .or_else(|| config.log_file.as_ref().map(PathBuf::from));
    if let Some(path) = log_path {
        init_file_logging(&path, config.debug_enabled())?;
    }

    let prompt = collect_prompt(&args.prompt)?;
    let registry = build_registry(&config, &config_path, &args)?;
    debug!(provider = %registry.active().name, "session starting");

    if args.no_interaction {
        return oneshot::run_oneshot(&registry, config.system_prompt(), &prompt).await;
    }

    let app = App::new(registry, config.system_prompt(), config.history_limit());
    run_chat(app, startup_actions(args.select_provider, prompt)).await
}

/// What the interactive session does first. With the provider selector
/// requested, a given prompt waits in the input instead of being sent.
fn startup_actions(select_provider: bool, prompt: String) -> Vec<AppAction> {
    let has_prompt = !prompt.trim().is_empty();
    match (select_provider, has_prompt) {
        (true, true) => vec![
            AppAction::Paste(prompt),
            AppAction::OpenSelector(SelectorKind::Provider),
        ],
        (true, false) => vec![AppAction::OpenSelector(SelectorKind::Provider)],
        (false, true) => vec![AppAction::SubmitText(prompt)],
        (false, false) => Vec::new(),
    }
}

/// Joins the positional words and appends piped stdin, if any.
fn collect_prompt(words: &[String]) -> Result<String, Box<dyn Error>> {
    let mut prompt = words.join(" ");

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut piped = String::new();
        stdin.lock().read_to_string(&mut piped)?;
        let piped = piped.trim_end();
        if !piped.is_empty() {
            if !prompt.is_empty() {
                prompt.push_str("\n\n");
            }
            prompt.push_str(piped);
        }
    }

    Ok(prompt)
}

fn build_registry(
    config: &Config,
    config_path: &Path,
    args: &Args,
) -> Result<ProviderRegistry, Box<dyn Error>> {
    let specs = load_builtin_providers()?;
    let store = ConfigStore::new(config_path.to_path_buf(), config.use_keyring());

    let mut registry = ProviderRegistry::from_config(
        specs,
        config,
        |spec| store.lookup_api_key(spec),
        Box::new(store.clone()),
    )?;

    if let Some(provider) = &args.use_provider {
        registry.activate_without_saving(provider)?;
    }
    if let Some(model) = &args.model {
        registry.override_model(model)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_words_and_flags_parse() {
        let args = Args::try_parse_from([
            "chait",
            "-n",
            "--use-provider",
            "openai",
            "what",
            "is",
            "rust",
        ])
        .expect("parse");
        assert!(args.no_interaction);
        assert!(!args.select_provider);
        assert_eq!(args.use_provider.as_deref(), Some("openai"));
        assert_eq!(args.prompt, vec!["what", "is", "rust"]);
        assert!(args.command.is_none());
    }

    #[test]
    fn config_subcommand_parses() {
        let args = Args::try_parse_from(["chait", "config", "providers.grok.temperature", "0.5"])
            .expect("parse");
        match args.command {
            Some(Commands::Config { show, key, value }) => {
                assert!(!show);
                assert_eq!(key.as_deref(), Some("providers.grok.temperature"));
                assert_eq!(value.as_deref(), Some("0.5"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let args = Args::try_parse_from(["chait", "config", "--show"]).expect("parse");
        assert!(matches!(
            args.command,
            Some(Commands::Config { show: true, .. })
        ));
    }

    #[test]
    fn provider_and_model_flags_override_the_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            use_keyring: Some(false),
            ..Config::default()
        };
        let args = Args::try_parse_from(["chait", "--use-provider", "nope"]).expect("parse");
        assert!(build_registry(&config, &dir.path().join("config.toml"), &args).is_err());

        let args = Args::try_parse_from(["chait", "--use-provider", "grok", "-m", "grok-2-1212"])
            .expect("parse");
        let registry =
            build_registry(&config, &dir.path().join("config.toml"), &args).expect("registry");
        let status = registry.active();
        assert_eq!(status.name, "grok");
        assert_eq!(status.current_model, "grok-2-1212");
    }

    #[test]
    fn provider_flag_takes_no_value_and_opens_the_selector() {
        let args = Args::try_parse_from(["chait", "-p", "hello"]).expect("parse");
        assert!(args.select_provider);
        assert_eq!(args.prompt, vec!["hello"]);
        assert!(Args::try_parse_from(["chait", "-p", "-n", "hi"]).is_err());

        assert_eq!(
            startup_actions(true, String::new()),
            vec![AppAction::OpenSelector(SelectorKind::Provider)]
        );
        assert_eq!(
            startup_actions(true, "hello".to_string()),
            vec![
                AppAction::Paste("hello".to_string()),
                AppAction::OpenSelector(SelectorKind::Provider),
            ]
        );
        assert_eq!(
            startup_actions(false, "hello".to_string()),
            vec![AppAction::SubmitText("hello".to_string())]
        );
        assert!(startup_actions(false, "  ".to_string()).is_empty());
    }
}
