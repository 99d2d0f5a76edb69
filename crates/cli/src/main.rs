use clap::{Parser, Subcommand};
use lib::history::{ChatHistory, Message, Origin};

#[derive(Parser)]
#[command(name = "cue")]
#[command(about = "Cue CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a placeholder config file.
    Init {
        /// Config file path (default: CUE_CONFIG_PATH or ~/.cue/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Chat with the configured agent (interactive). Cards are printed with
    /// numbered chips; enter a number to pick one.
    Chat {
        /// Config file path (default: CUE_CONFIG_PATH or ~/.cue/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("cue {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config }) => {
            if let Err(e) = run_chat(config).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

const GREETING: &str = "Hello! I'm Cue.\n\n\
    I pass your questions to the configured agent.\n\n\
    What can I help you with?";

async fn run_chat(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _path) = lib::config::load_config(config_path)?;
    lib::init::require_configured(&config)?;
    let token = lib::config::resolve_access_token(&config)
        .ok_or_else(|| anyhow::anyhow!("no access token"))?;

    let agent = &config.agent;
    let session = lib::session::Session::for_agent(agent);
    let client = lib::agent::DialogClient::new(agent.endpoint.clone(), token);
    log::info!("chat: session {}", session.id);

    let mut history = ChatHistory::new();
    let greeting = Message::agent(GREETING);
    println!("{}", greeting.text);
    println!();
    history.append(greeting);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            println!("Please enter a message.");
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        // A bare number picks the matching chip from the most recent card.
        let outgoing = match input.parse::<usize>() {
            Ok(n) if n >= 1 => match last_card_action(&history, n - 1) {
                Some(label) => label,
                None => {
                    println!("No chip [{}] to pick.", n);
                    continue;
                }
            },
            _ => input.to_string(),
        };

        history.append(Message::user(outgoing.clone()));
        match client
            .detect_intent(&session.name, &outgoing, &agent.language_code)
            .await
        {
            Ok(response) => {
                let replies = lib::reply::interpret(&response);
                if replies.is_empty() {
                    println!("(the agent sent nothing to display)");
                }
                for message in replies {
                    print_message(&message);
                    history.append(message);
                }
            }
            Err(e) => {
                log::error!("chat turn failed: {}", e);
                eprintln!("message failed: {}", e);
            }
        }
    }

    Ok(())
}

/// Chip label at `index` on the most recent card, if any.
fn last_card_action(history: &ChatHistory, index: usize) -> Option<String> {
    history
        .all()
        .iter()
        .rev()
        .find(|m| m.origin == Origin::Card)
        .and_then(|m| m.action(index))
        .map(str::to_string)
}

fn print_message(message: &Message) {
    println!("< {}", message.text.trim());
    for (i, label) in message.actions.iter().enumerate() {
        println!("  [{}] {}", i + 1, label);
    }
    if message.has_link() {
        // Links are opened by hand from the terminal; nothing is sent for them.
        println!("  link: {}", message.link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picking_a_chip_resolves_to_its_label() {
        let mut history = ChatHistory::new();
        history.append(Message::agent("hi"));
        history.append(Message::card(
            "pick one",
            "",
            vec!["X".into(), "Y".into(), "Z".into()],
        ));
        assert_eq!(last_card_action(&history, 1), Some("Y".to_string()));
        assert_eq!(last_card_action(&history, 3), None);
    }

    #[test]
    fn latest_card_wins_over_earlier_ones() {
        let mut history = ChatHistory::new();
        history.append(Message::card("old", "", vec!["Old".into()]));
        history.append(Message::user("next"));
        history.append(Message::card("new", "", vec!["New".into()]));
        assert_eq!(last_card_action(&history, 0), Some("New".to_string()));
    }

    #[test]
    fn no_card_means_no_chip() {
        let mut history = ChatHistory::new();
        history.append(Message::agent("hi"));
        assert_eq!(last_card_action(&history, 0), None);
    }
}
