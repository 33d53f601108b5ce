//! Play tones typed on stdin through the default output device.
//!
//! Run with: cargo run --example stdin_port --features cpal_sink
//!
//! Press Enter on an empty line to activate audio, then type messages such as
//! `{"frequency": 523.25, "sineTerms": [0, 0, 1, 0, 1]}` or just `440`.
//! Set `RUST_LOG=toneport=debug` to watch voices start and stop.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, TryRecvError};
use std::thread::{self, sleep};
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use toneport::{BackendError, Engine, ToneConfig, TonePort};

/// Blocks rendered ahead of the device clock
const BLOCKS_AHEAD: u64 = 8;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (lines_tx, lines_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut port = TonePort::new(ToneConfig::default(), Engine::default_output);
    println!("Press Enter to start audio, then type tone messages. Ctrl+D to quit.");

    let mut clock: Option<(Instant, u64)> = None;

    loop {
        match lines_rx.try_recv() {
            Ok(line) if line.trim().is_empty() => {
                if let Ok(true) = port.activate() {
                    clock = Some((Instant::now(), 0));
                    println!("Audio ready.");
                }
            }
            Ok(line) => {
                // failures are already logged by the port
                let _ = port.play(&line);
            }
            Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        render(&mut port, &mut clock);
        port.poll();
        sleep(Duration::from_micros(500));
    }

    // let pending tones ring out
    while port.active_voices() > 0 {
        render(&mut port, &mut clock);
        port.poll();
        sleep(Duration::from_micros(500));
    }
}

/// Render blocks until the engine is `BLOCKS_AHEAD` blocks past the wall clock
fn render<F>(port: &mut TonePort<Engine, F>, clock: &mut Option<(Instant, u64)>)
where
    F: FnMut() -> Result<Engine, BackendError>,
{
    let (Some((started, blocks)), Some(engine)) = (clock.as_mut(), port.backend_mut()) else {
        return;
    };
    let rate = engine.sample_rate() as f64;
    let target = (started.elapsed().as_secs_f64() * rate / 64.0) as u64 + BLOCKS_AHEAD;
    while *blocks < target {
        engine.process();
        *blocks += 1;
    }
}
