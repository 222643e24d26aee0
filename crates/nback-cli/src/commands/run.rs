//! The `nback run` command.
//!
//! Drives one session: stimuli print to stdout as the clock presents them,
//! and match claims are read line by line from stdin (`m` for match, `n`
//! for no match, `q` to quit).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use nback_collector::config::load_config_from;
use nback_collector::{create_collector, deliver_with_retry};
use nback_core::clock::{SessionEvent, SessionHandle};
use nback_core::model::Subject;
use nback_core::summary::SessionSummary;

pub struct RunArgs {
    pub lag: Option<usize>,
    pub trials: Option<usize>,
    pub match_rate: Option<f64>,
    pub stimulus_ms: Option<u64>,
    pub response_ms: Option<u64>,
    pub seed: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub no_deliver: bool,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let mut session_config = config.session.clone();
    if let Some(v) = args.lag {
        session_config.lag = v;
    }
    if let Some(v) = args.trials {
        session_config.trial_count = v;
    }
    if let Some(v) = args.match_rate {
        session_config.target_match_rate = v;
    }
    if let Some(v) = args.stimulus_ms {
        session_config.timing.stimulus_ms = v;
    }
    if let Some(v) = args.response_ms {
        session_config.timing.response_window_ms = v;
    }

    let subject = Subject {
        first_name: args.name.unwrap_or_default(),
        email: args.email.unwrap_or_default(),
    };

    let lag = session_config.lag;
    let trial_count = session_config.trial_count;
    println!("{lag}-Back Test: {trial_count} trials.");
    println!("Type m (match), n (no match), or q (quit), then Enter.");
    println!("The first {lag} stimuli are warm-up; responses start after that.\n");

    let mut handle = match args.seed {
        Some(seed) => SessionHandle::start_seeded(session_config, seed)?,
        None => SessionHandle::start(session_config)?,
    };

    let mut input = spawn_stdin_reader();
    let mut input_open = true;
    let mut current = 0usize;

    loop {
        tokio::select! {
            event = handle.next_event() => {
                let Some(event) = event else { break };
                match event {
                    SessionEvent::Stimulus { index, symbol, awaiting_response } => {
                        current = index;
                        if awaiting_response {
                            println!("[{:>2}/{trial_count}]  {symbol}", index + 1);
                        } else {
                            println!("[{:>2}/{trial_count}]  {symbol}   (warm-up)", index + 1);
                        }
                    }
                    SessionEvent::Feedback { correct, .. } => {
                        println!("        {}", if correct { "correct" } else { "incorrect" });
                    }
                    SessionEvent::TimedOut { .. } => {
                        println!("        no response");
                    }
                    SessionEvent::Finished { .. } => break,
                    SessionEvent::Aborted { .. } => {
                        println!("\nSession aborted.");
                        break;
                    }
                }
            }
            line = input.recv(), if input_open => {
                match line.as_deref().map(str::trim) {
                    None => input_open = false,
                    Some("m") => handle.respond(current, true).await,
                    Some("n") => handle.respond(current, false).await,
                    Some("q") => handle.abort().await,
                    Some("") => {}
                    Some(other) => {
                        tracing::info!("unrecognized input '{other}', expected m/n/q");
                    }
                }
            }
        }
    }

    let session = handle.join().await?;
    let summary = session.summary(&subject);
    print_summary(&summary);

    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());
    let path = output_dir.join(format!("session-{}.json", summary.id));
    summary.save_json(&path)?;
    println!("Summary saved to {}", path.display());

    if !args.no_deliver {
        if let Some(collector_config) = &config.collector {
            let collector = create_collector(collector_config)?;
            let delay = Duration::from_millis(config.retry_delay_ms);
            match deliver_with_retry(collector.as_ref(), &summary, config.max_retries, delay).await
            {
                Ok(()) => println!("Results delivered."),
                Err(e) => {
                    // The session result stands whether or not delivery works.
                    tracing::error!("delivery failed: {e:#}");
                    eprintln!("Delivery failed; the summary is saved locally.");
                }
            }
        }
    }

    Ok(())
}

/// Forward stdin lines into a channel so the event loop can select on them.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    rx
}

fn print_summary(summary: &SessionSummary) {
    use comfy_table::Table;

    let mut table = Table::new();
    table.set_header(vec!["Test", "Trials", "Correct", "Incorrect", "Accuracy", "Status"]);
    table.add_row(vec![
        summary.test_type(),
        summary.total_trials.to_string(),
        summary.correct.to_string(),
        summary.incorrect.to_string(),
        format!("{:.2}%", summary.accuracy),
        summary.status.to_string(),
    ]);

    println!("\n{table}");
}
