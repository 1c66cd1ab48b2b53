//! Ordering Dialog Demo Application
//!
//! Drives the dialog engine from the terminal, standing in for the client
//! device: Utterance → Page Rules → NLU Fallback → Response → Confirmation

use anyhow::{Context, Result};
use clap::Parser;
use dialog_engine::{
    ActionResult, DialogEngine, EngineConfig, HandledBy, Page, SessionStore, Turn, UtteranceEvent,
};
use nlu_client::MockNlu;
use slot_matcher::SlotCatalog;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "order-demo")]
#[command(about = "Voice ordering dialog demo")]
struct Args {
    /// Session id used for every utterance
    #[arg(long, default_value = "1")]
    session: u64,

    /// Page the simulated client starts on
    #[arg(long, default_value = "100")]
    page: u32,

    /// Interactive mode (read utterances from stdin)
    #[arg(long)]
    interactive: bool,

    /// Send a single utterance and exit
    #[arg(long)]
    test_utterance: Option<String>,

    /// Confirm every dispatched action with actionTrue
    #[arg(long)]
    auto_confirm: bool,
}

/// The client side of the conversation: current page and sequence counter
struct Client {
    session: u64,
    page: u32,
    seq: u64,
    auto_confirm: bool,
}

impl Client {
    fn event(&mut self, query: &str) -> UtteranceEvent {
        self.seq += 1;
        UtteranceEvent::new(self.session, self.page, query).with_seq(self.seq)
    }

    async fn say(&mut self, engine: &DialogEngine, query: &str) -> Result<()> {
        let event = self.event(query);
        let turn = engine.handle(&event).await;
        print_turn(&turn);

        let response = &turn.response;
        if response.awaits_confirmation() {
            if !self.auto_confirm {
                println!("   (action pending, run with --auto-confirm to carry it out)");
                return Ok(());
            }
            self.page = response.proposed_page;
            let confirm = self.event("").with_result(ActionResult::ActionTrue);
            let committed = engine.handle(&confirm).await;
            print_turn(&committed);
        } else if !response.proposes(Page::NoMatch) {
            self.page = response.proposed_page;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();

    info!("Starting ordering dialog demo");

    slot_matcher::init().context("failed to init slot matcher")?;
    dialog_engine::init().context("failed to init dialog engine")?;

    let engine = DialogEngine::new(
        Arc::new(SlotCatalog::builtin()),
        Arc::new(SessionStore::new()),
        Arc::new(MockNlu::scripted()),
        EngineConfig::default(),
    );
    let mut client = Client {
        session: args.session,
        page: args.page,
        seq: 0,
        auto_confirm: args.auto_confirm,
    };

    if let Some(utterance) = args.test_utterance {
        client.say(&engine, &utterance).await?;
    } else if args.interactive {
        run_interactive_demo(&engine, &mut client).await?;
    } else {
        client.auto_confirm = true;
        run_demo_order(&engine, &mut client).await?;
    }

    info!("Ordering demo completed");
    Ok(())
}

async fn run_interactive_demo(engine: &DialogEngine, client: &mut Client) -> Result<()> {
    println!("Ordering Dialog Demo");
    println!("Type what you would say and press Enter (or 'quit' to exit):");
    println!("Examples:");
    println!("  - 'menu'");
    println!("  - 'a burrito bowl'");
    println!("  - 'chicken and steak'");
    println!("  - 'no thanks'");
    println!("  - 'cancel'");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("[page {}] You: ", client.page);
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let utterance = input.trim();

        if utterance.eq_ignore_ascii_case("quit") || utterance.eq_ignore_ascii_case("exit") {
            break;
        }

        client.say(engine, utterance).await?;
        println!();
    }

    Ok(())
}

async fn run_demo_order(engine: &DialogEngine, client: &mut Client) -> Result<()> {
    let script = vec![
        "menu",
        "a burrito bowl",
        "chicken and steak please",
        "white rice and black beans",
        "mild salsa",
        "cheese and sour cream",
        "guac",
        "chips",
        "lemonade",
        "yes add it",
        "checkout",
        "checkout",
        "12:30 pm",
        "google pay",
        "yes",
    ];

    println!("Running ordering demo with {} utterances", script.len());
    println!();

    for (i, utterance) in script.iter().enumerate() {
        println!("{}/{}: [page {}] \"{}\"", i + 1, script.len(), client.page, utterance);
        client.say(engine, utterance).await?;
        println!();
    }

    println!("Demo completed on page {}", client.page);
    Ok(())
}

fn print_turn(turn: &Turn) {
    let response = &turn.response;
    let stage = match turn.handled_by {
        HandledBy::Confirmation => "confirm",
        HandledBy::Keyword => "keyword",
        HandledBy::Nlu => "nlu",
        HandledBy::NluFailed => "nlu-failed",
        HandledBy::NoMatch => "no-match",
        HandledBy::Cancelled => "cancel",
        HandledBy::Silent => "silent",
    };
    println!(
        "   {} -> {} [{}] \"{}\"",
        response.previous_page,
        response.proposed_page,
        stage,
        response.speech()
    );
    if !response.entities.is_empty() {
        println!("   entities: {:?}", response.entities);
    }
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
