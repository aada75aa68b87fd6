//! Gear selection from stdin. A line containing a gear number (1..=10)
//! switches the model used for speed-to-power conversion.

use power_model::Gear;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

pub async fn run(selection: watch::Sender<Gear>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => apply_selection(line.trim(), &selection),
            Ok(None) => break,
            Err(e) => {
                log::error!("stdin error: {}", e);
                break;
            }
        }
    }
}

fn apply_selection(line: &str, selection: &watch::Sender<Gear>) {
    if line.is_empty() {
        return;
    }

    let number = match line.parse::<u8>() {
        Ok(n) => n,
        Err(_) => {
            log::warn!("ignoring gear input '{}'", line);
            return;
        }
    };

    match Gear::new(number) {
        Ok(gear) => {
            selection.send_replace(gear);
            log::info!("gear changed to {}", number);
        }
        Err(e) => log::warn!("{}", e),
    }
}
