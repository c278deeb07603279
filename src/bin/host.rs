//! Host companion: judge responses from another machine
//!
//! Finds the game's relay over mDNS (or takes an address), prints what the
//! game sends and answers with verdicts typed on stdin.

use buzzboard::network::client::{parse_address, parse_command};
use buzzboard::network::{find_relay, HostClient, Message};
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn show(msg: &Message) {
    match msg {
        Message::Answer(response) => println!("\nCorrect response: {}", response),
        Message::RangIn => println!("A player rang in. Correct? [y/n]"),
        Message::Continue => println!("Nobody got it. Press Enter to continue."),
        other => println!("{}", other.to_text()),
    }
}

fn run(address: Option<String>) -> io::Result<()> {
    let addr = match address {
        Some(address) => parse_address(&address)?,
        None => {
            println!("Looking for a game on the local network...");
            find_relay(DISCOVERY_TIMEOUT)
                .map_err(io::Error::other)?
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no game found; pass its address"))?
        }
    };

    let mut client = HostClient::connect_addr(addr)?;
    println!("Connected to {}. Type y or n to judge, Enter to continue.", addr);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        for msg in client.poll() {
            show(&msg);
        }
        match rx.try_recv() {
            Ok(line) => client.send(parse_command(&line))?,
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }
        if !client.is_connected() {
            println!("The game closed the connection.");
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("buzzboard=warn")))
        .with_writer(io::stderr)
        .init();

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "host companion failed");
            eprintln!("buzzboard-host: {}", e);
            ExitCode::FAILURE
        }
    }
}
