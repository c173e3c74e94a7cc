use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::WatchConfig;
use crate::notifiers::{Notifier, SeatAlert};
use crate::scraper::{SeatScraper, SeatStatus};
use crate::session::PageSource;
use crate::tracker::{self, CourseStatus};
use crate::utils::error::Result;

/// Summary of one poll cycle, for console output and tests.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub checked: usize,
    pub open: usize,
    pub not_found: usize,
    pub opened: Vec<String>,
}

/// The polling loop: scrape, diff against last cycle, alert on transitions,
/// sleep. Owns the page source and the status map for its whole lifetime.
pub struct Poller<P: PageSource> {
    page: P,
    config: WatchConfig,
    scraper: SeatScraper,
    notifiers: Vec<Box<dyn Notifier>>,
    statuses: CourseStatus,
}

impl<P: PageSource> Poller<P> {
    pub fn new(page: P, config: WatchConfig, notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Poller {
            page,
            config,
            scraper: SeatScraper::new(),
            notifiers,
            statuses: CourseStatus::new(),
        }
    }

    pub fn statuses(&self) -> &CourseStatus {
        &self.statuses
    }

    /// One scrape-diff-notify pass. Only a lost browser session errors out;
    /// scrape misses and notification failures are absorbed here.
    pub async fn cycle(&mut self) -> Result<CycleReport> {
        let html = self.page.content()?;
        let snapshot = self.scraper.scan(&html, &self.config.crns);
        let diff = tracker::diff(&self.statuses, &snapshot, self.config.notify_repeat);

        let mut open = 0;
        let mut not_found = 0;
        for crn in &self.config.crns {
            match snapshot[crn].status {
                SeatStatus::Open(seats) => {
                    open += 1;
                    info!("[{}] {} seat(s) open", crn, seats);
                }
                SeatStatus::Closed => info!("[{}] full", crn),
                SeatStatus::NotFound => {
                    not_found += 1;
                    warn!("[{}] not found on results page", crn);
                }
            }
        }

        for crn in &diff.opened {
            let observation = &snapshot[crn];
            let seats = match observation.status {
                SeatStatus::Open(seats) => seats,
                _ => continue,
            };

            let alert = SeatAlert {
                crn: crn.clone(),
                seats,
                title: observation.title.clone(),
                detail: observation.detail.clone(),
            };

            for notifier in &self.notifiers {
                match notifier.notify(&alert).await {
                    Ok(()) => info!("{} alert sent for CRN {}", notifier.name(), crn),
                    Err(e) => warn!("{} alert failed for CRN {}: {}", notifier.name(), crn, e),
                }
            }
        }

        let report = CycleReport {
            checked: self.config.crns.len(),
            open,
            not_found,
            opened: diff.opened,
        };
        self.statuses = diff.updated;
        Ok(report)
    }

    /// Poll until shutdown is signalled. Returns Err only when the browser
    /// session is lost; there is no re-establishment.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut interval = tokio::time::interval(Duration::from_secs(self.config.poll_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Watching {} CRN(s) every {}s: {}",
            self.config.crns.len(),
            self.config.poll_seconds,
            self.config.crns.join(", ")
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.cycle().await?;
                    info!(
                        "Cycle complete: {} checked, {} open, {} not found",
                        report.checked, report.open, report.not_found
                    );
                }
                _ = shutdown.changed() => {
                    info!("Shutdown requested, stopping poll loop");
                    return Ok(());
                }
            }
        }
    }
}
