//! Live history viewer - Polls the run history written by `colony-rl` and
//! redraws a text chart of steps and births per run.

use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use colony_rl::RunRecord;
use colony_rl::storage::{self, HISTORY_FILE};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const RETRY_DELAY: Duration = Duration::from_secs(1);
const BAR_WIDTH: u64 = 50;
const SHOWN_RUNS: usize = 30;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(HISTORY_FILE), PathBuf::from);

    let mut last_len = None;
    loop {
        match storage::read_history(&path) {
            Ok(None) => {
                log::info!("No history at {} yet", path.display());
                sleep(POLL_INTERVAL);
            }
            Err(e) => {
                log::debug!("History not readable yet: {}", e);
                sleep(RETRY_DELAY);
            }
            Ok(Some(history)) if history.is_empty() => sleep(POLL_INTERVAL),
            Ok(Some(history)) => {
                if last_len != Some(history.len()) {
                    draw(&history);
                    last_len = Some(history.len());
                }
                sleep(POLL_INTERVAL);
            }
        }
    }
}

fn draw(history: &[RunRecord]) {
    let max_steps = history.iter().map(|r| r.steps).max().unwrap_or(0);
    let max_births = history.iter().map(|r| r.births).max().unwrap_or(0);
    let start = history.len().saturating_sub(SHOWN_RUNS);

    println!();
    println!("Colony progress over {} runs", history.len());
    println!("{:>5}  {:<52} {:<52}", "run", "steps (survival)", "births");
    for (i, run) in history.iter().enumerate().skip(start) {
        println!(
            "{:>5}  {:<52} {:<52}",
            i + 1,
            bar(run.steps, max_steps, '#'),
            bar(run.births, max_births, '*'),
        );
    }
    println!(
        "max steps {}, max births {}, last mean max-Q {:.3}",
        max_steps,
        max_births,
        history.last().map_or(0.0, |r| r.max_q)
    );
}

fn bar(value: u64, max: u64, glyph: char) -> String {
    let len = (value * BAR_WIDTH / max.max(1)) as usize;
    format!("{} {}", glyph.to_string().repeat(len), value)
}
