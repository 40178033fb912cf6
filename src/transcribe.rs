use std::io::Write;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::api::{ApiClient, TranscriptionResult};

/// Stages of the transcription flow. The backend exposes no progress
/// events, so in-flight stages advance with elapsed request time and the
/// terminal stages are decided by the real response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validating,
    CheckingInfluencer,
    Downloading,
    Transcribing,
    Done,
    Failed,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Validating => "Validando URL...",
            Phase::CheckingInfluencer => "Verificando se é vídeo de influenciador...",
            Phase::Downloading => "Baixando vídeo...",
            Phase::Transcribing => "Transcrevendo...",
            Phase::Done => "Concluído!",
            Phase::Failed => "Falhou",
        }
    }

    /// In-flight stage after `elapsed` with no response yet. Holds at
    /// Transcribing until the backend answers.
    pub fn at(elapsed: Duration) -> Phase {
        match elapsed.as_secs() {
            0 => Phase::Validating,
            1..=2 => Phase::CheckingInfluencer,
            3..=4 => Phase::Downloading,
            _ => Phase::Transcribing,
        }
    }
}

const TICK: Duration = Duration::from_millis(800);

/// Display percent for an in-flight request: climbs with elapsed time but
/// holds below completion until the real response arrives.
pub fn progress_percent(elapsed: Duration) -> u8 {
    let ticks = elapsed.as_millis() / TICK.as_millis();
    let pct = 10 + ticks * 15;
    pct.min(90) as u8
}

/// Cheap client-side validation before any request leaves the machine.
pub fn is_tiktok_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    (lowered.starts_with("https://") || lowered.starts_with("http://"))
        && lowered.contains("tiktok.com/")
}

/// Run the transcription request on a worker thread while ticking a
/// progress line on stderr. The tick is the `recv_timeout` below, so it is
/// structurally tied to the operation: once the response (or an error)
/// arrives the loop ends and no periodic task is left behind.
pub fn run(client: &ApiClient, url: &str, quiet: bool) -> Result<TranscriptionResult> {
    if !is_tiktok_url(url) {
        anyhow::bail!("Not a TikTok video URL: {url}");
    }

    let (tx, rx) = mpsc::channel();
    let worker_client = client.clone();
    let worker_url = url.to_string();
    thread::spawn(move || {
        let _ = tx.send(worker_client.transcribe(&worker_url));
    });

    let started = Instant::now();

    let outcome = loop {
        match rx.recv_timeout(TICK) {
            Ok(outcome) => break outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if !quiet {
                    let elapsed = started.elapsed();
                    eprint!(
                        "\x1b[2K\r[{:>3}%] {}",
                        progress_percent(elapsed),
                        Phase::at(elapsed).label()
                    );
                    let _ = std::io::stderr().flush();
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("Transcription worker exited unexpectedly");
            }
        }
    };

    if !quiet {
        eprint!("\x1b[2K\r");
        let _ = std::io::stderr().flush();
    }

    let result = outcome?;

    if !quiet {
        let phase = if result.success { Phase::Done } else { Phase::Failed };
        eprintln!("[100%] {}", phase.label());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_with_elapsed_time() {
        assert_eq!(Phase::at(Duration::from_millis(500)), Phase::Validating);
        assert_eq!(Phase::at(Duration::from_secs(1)), Phase::CheckingInfluencer);
        assert_eq!(Phase::at(Duration::from_secs(3)), Phase::Downloading);
        assert_eq!(Phase::at(Duration::from_secs(5)), Phase::Transcribing);
        assert_eq!(Phase::at(Duration::from_secs(300)), Phase::Transcribing);
    }

    #[test]
    fn progress_holds_below_completion() {
        assert_eq!(progress_percent(Duration::from_secs(0)), 10);
        assert!(progress_percent(Duration::from_secs(2)) < 90);
        assert_eq!(progress_percent(Duration::from_secs(60)), 90);
        assert_eq!(progress_percent(Duration::from_secs(3600)), 90);
    }

    #[test]
    fn url_validation_requires_tiktok_host() {
        assert!(is_tiktok_url("https://www.tiktok.com/@maria/video/7301"));
        assert!(is_tiktok_url("https://vm.tiktok.com/ZMabc123/"));
        assert!(!is_tiktok_url("https://example.com/video/1"));
        assert!(!is_tiktok_url("tiktok.com/@maria/video/7301"));
        assert!(!is_tiktok_url(""));
    }
}
