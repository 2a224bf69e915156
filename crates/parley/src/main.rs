//! The voice conversation console.
//!
//! A thin presentation layer over the conversation controller: it
//! renders stage changes, errors and exchanges as they happen, and
//! translates keyboard input into controller commands.

#[macro_use]
extern crate tracing;

mod ui;

use std::env;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use parley_command_speech::{CommandRecognizer, CommandSynthesizer};
use parley_core::conversation::Role;
use parley_core::voice::VoiceServiceBuilder;
use parley_core::{ControllerBuilder, Stage};
use parley_relay::client::HttpRelayConnector;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;

enum UiEvent {
    Stage(Stage),
    Error(String),
    Entry(Role, String),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(relay_url) = env::var("PARLEY_RELAY_URL") else {
        eprintln!("PARLEY_RELAY_URL environment variable is not set");
        return;
    };
    let Ok(capture_cmdline) = env::var("PARLEY_CAPTURE_COMMAND") else {
        // No capture engine means no voice conversation at all.
        eprintln!(
            "PARLEY_CAPTURE_COMMAND environment variable is not set; \
             speech capture is not available on this host"
        );
        return;
    };
    let speak_program = env::var("PARLEY_SPEAK_COMMAND")
        .unwrap_or_else(|_| "espeak".to_owned());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let voice = VoiceServiceBuilder::new()
        .with_recognition(CommandRecognizer::new(capture_cmdline))
        .with_synthesis(CommandSynthesizer::new(speak_program));
    let controller =
        ControllerBuilder::with_relay_connector(HttpRelayConnector::new(
            &relay_url,
        ))
        .with_voice(voice)
        .on_stage({
            let event_tx = event_tx.clone();
            move |stage| {
                event_tx.send(UiEvent::Stage(stage)).ok();
            }
        })
        .on_error({
            let event_tx = event_tx.clone();
            move |message| {
                event_tx.send(UiEvent::Error(message.to_owned())).ok();
            }
        })
        .on_entry({
            let event_tx = event_tx.clone();
            move |entry| {
                event_tx
                    .send(UiEvent::Entry(entry.role, entry.content.clone()))
                    .ok();
            }
        })
        .build();

    println!("{}", "PARLEY".bold());
    println!(
        "Enter starts or stops a turn, 'h' shows recent exchanges, \
         'q' quits."
    );
    println!("{}", ui::stage_line(Stage::Idle));

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut stdin = io::BufReader::new(io::stdin()).lines();
    let mut stage = Stage::Idle;
    let mut recent: Vec<(Role, String)> = Vec::new();
    let mut progress_bar: Option<ProgressBar> = None;

    loop {
        select! {
            line = stdin.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        error!("error reading input: {err}");
                        break;
                    }
                };
                match line.trim() {
                    "q" => break,
                    "h" => println!("{}", ui::render_recent(&recent)),
                    "" => match stage {
                        Stage::Idle | Stage::Listening => {
                            controller.start_listening();
                        }
                        Stage::Speaking => controller.stop_speaking(),
                        Stage::Processing => {
                            println!("{}", "Still thinking...".dimmed());
                        }
                    },
                    other => {
                        println!("Unknown command: {other}");
                    }
                }
            }
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };

                // Finish the spinner before printing anything else.
                if let Some(progress_bar) = progress_bar.take() {
                    progress_bar.finish_and_clear();
                }

                match event {
                    UiEvent::Stage(new_stage) => {
                        stage = new_stage;
                        if stage == Stage::Processing {
                            let bar = ProgressBar::new_spinner();
                            bar.set_style(progress_style.clone());
                            bar.set_message("Thinking...");
                            bar.enable_steady_tick(
                                Duration::from_millis(100),
                            );
                            progress_bar = Some(bar);
                        } else {
                            println!("{}", ui::stage_line(stage));
                        }
                    }
                    UiEvent::Error(message) => {
                        println!("{}", ui::error_line(&message));
                    }
                    UiEvent::Entry(role, content) => {
                        println!("{}", ui::entry_line(role, &content));
                        recent.push((role, content));
                    }
                }
            }
        }
    }

    controller.shutdown();
}
