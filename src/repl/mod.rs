//! # Terminal Front-End
//!
//! A line-oriented adapter over `SessionRuntime`: reads commands from stdin,
//! turns them into `Action`s, and prints the session as plain text.
//!
//! Background work (deck top-ups, chat replies, dream matches) is merged
//! while the loop waits for input, so results show up without a keypress.

pub mod command;
pub mod render;

use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::Action;
use crate::runtime::SessionRuntime;
use command::{Command, HELP};

fn show(runtime: &SessionRuntime) {
    print!("{}", render::render(runtime.session()));
}

pub async fn run(mut runtime: SessionRuntime) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Welcome to Spark! Type `help` for commands.");
    runtime.dispatch(Action::Start);
    show(&runtime);

    loop {
        let busy = runtime.in_flight() > 0;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed, leaving");
                    break;
                };
                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                debug!("Command: {:?}", command);
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Wait => {
                        runtime.settle().await;
                        show(&runtime);
                    }
                    other => match other.to_action(runtime.session()) {
                        Ok(Some(action)) => {
                            runtime.dispatch(action);
                            show(&runtime);
                        }
                        Ok(None) => {}
                        Err(e) => println!("{e}"),
                    },
                }
            }
            Some(action) = runtime.next_completion(), if busy => {
                runtime.dispatch(action);
                show(&runtime);
            }
        }
    }

    info!("Session ended with {} match(es)", runtime.session().matches.len());
    Ok(())
}
