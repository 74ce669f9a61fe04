//! Interactive conversion session CLI.
//!
//! Drives one document through the bridge resolver's decision queue,
//! prompting for each choice on stdin.
//!
//! ```bash
//! XML_BRIDGE_URL=http://localhost:8000 \
//!   cargo run --bin bridge_session -- score.cmme --from cmme --to mei
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;

use xml_bridge_client::client::{HttpResolver, ResolverApi};
use xml_bridge_client::config::BridgeConfig;
use xml_bridge_client::session::{CancelToken, SessionController};
use xml_bridge_client::{BridgeError, Decision, OptionValue, Resolution};

#[derive(Parser)]
#[command(name = "bridge_session", about = "Interactive notation conversion")]
struct Args {
    /// Source document to convert
    file: PathBuf,

    /// Source schema (e.g. cmme, mei, json)
    #[arg(long = "from")]
    source_format: String,

    /// Target schema (e.g. cmme, mei, json)
    #[arg(long = "to")]
    target_format: String,

    /// Resolver base URL
    #[arg(long, env = "XML_BRIDGE_URL")]
    url: Option<String>,

    /// Ask the resolver to remember every choice for similar ambiguities
    #[arg(long)]
    save_preferences: bool,

    /// Write the converted artifact here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Prompts on stdin: numbered options, empty input takes the default.
struct StdinChooser {
    save_preference: bool,
}

impl StdinChooser {
    fn prompt(decision: &Decision) -> Result<OptionValue, BridgeError> {
        println!("\n[{}] {}", decision.context, decision.description);
        if let Some(impact) = &decision.impact {
            println!("    impact: {}", impact);
        }
        for (i, option) in decision.options.iter().enumerate() {
            let marker = if decision.default_option.as_ref() == Some(option) {
                "*"
            } else {
                " "
            };
            println!("  {}{}) {}", marker, i + 1, option);
        }

        let stdin = io::stdin();
        loop {
            print!("choice [1-{}]: ", decision.options.len());
            io::stdout()
                .flush()
                .map_err(|e| BridgeError::user_input(e.to_string()))?;
            let mut line = String::new();
            stdin
                .lock()
                .read_line(&mut line)
                .map_err(|e| BridgeError::user_input(e.to_string()))?;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if let Some(default) = &decision.default_option {
                    return Ok(default.clone());
                }
                println!("no default for this decision; pick a number");
                continue;
            }
            match trimmed.parse::<usize>() {
                Ok(n) if n >= 1 && n <= decision.options.len() => {
                    return Ok(decision.options[n - 1].clone());
                }
                _ => println!("enter a number between 1 and {}", decision.options.len()),
            }
        }
    }
}

#[async_trait]
impl xml_bridge_client::DecisionChooser for StdinChooser {
    async fn choose(&self, decision: &Decision) -> xml_bridge_client::Result<Resolution> {
        let choice = Self::prompt(decision)?;
        Ok(Resolution::new(decision.id.clone(), choice).with_save_preference(self.save_preference))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = match &args.url {
        Some(url) => BridgeConfig::new(url)?,
        None => BridgeConfig::from_env()?,
    };
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let api: Arc<dyn ResolverApi> = Arc::new(HttpResolver::new(config)?);
    let mut controller = SessionController::new(api);

    let session = controller
        .start(&content, &args.source_format, &args.target_format)
        .await?;
    println!(
        "session {} opened: {} -> {}, {} pending decision(s)",
        session.id, session.source_format, session.target_format, session.pending_count
    );

    let chooser = StdinChooser {
        save_preference: args.save_preferences,
    };
    let token = CancelToken::new();
    let artifact = match controller.run_to_completion(&chooser, &token).await {
        Ok(Some(artifact)) => artifact,
        Ok(None) => anyhow::bail!("conversion loop stopped before completion"),
        Err(e) => return Err(e.into()),
    };

    println!(
        "\nconversion complete after {} resolution(s)",
        controller.history().len()
    );
    match &args.output {
        Some(path) => {
            std::fs::write(path, &artifact.content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("artifact written to {}", path.display());
        }
        None => println!("{}", artifact.content),
    }
    if let Some(evaluation) = &artifact.evaluation {
        println!("evaluation: {}", serde_json::to_string_pretty(evaluation)?);
    }
    Ok(())
}
