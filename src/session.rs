use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;

use crate::utils::error::{AppError, Result};

/// Registration portal landing page. The user logs in and runs their course
/// search by hand; the watcher only reads what the page renders afterwards.
pub const VT_REG_URL: &str =
    "https://registration.es.cloud.vt.edu/StudentRegistrationSsb/ssb/registration";

/// Narrow capability seam over the live browser: all the scraper ever needs
/// is the rendered page content. Tests substitute fixture HTML here.
pub trait PageSource {
    fn content(&self) -> Result<String>;
}

pub struct BrowserSession {
    // Keeps the Chrome process alive for the lifetime of the session.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a visible Chrome window. The session stays logged in only as
    /// long as the user keeps it; there is no re-establishment on loss.
    pub fn launch(chrome_path: Option<String>) -> Result<Self> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(false)
            .sandbox(false)
            .args(vec![
                std::ffi::OsStr::new("--start-maximized"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-extensions"),
                std::ffi::OsStr::new("--disable-background-timer-throttling"),
            ])
            .build()
            .map_err(|e| AppError::SessionLost(format!("Failed to create launch options: {}", e)))?;

        if let Some(path) = chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(path));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| AppError::SessionLost(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AppError::SessionLost(format!("Failed to open tab: {}", e)))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| AppError::SessionLost(format!("Navigation failed: {}", e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| AppError::SessionLost(format!("Page load failed: {}", e)))?;
        Ok(())
    }
}

impl PageSource for BrowserSession {
    fn content(&self) -> Result<String> {
        // If Chrome is gone (window closed, process crashed) this is the
        // call that notices; the poll loop treats it as terminal.
        self.tab
            .get_content()
            .map_err(|e| AppError::SessionLost(format!("Failed to read page content: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPage(&'static str);

    impl PageSource for FixedPage {
        fn content(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct DeadPage;

    impl PageSource for DeadPage {
        fn content(&self) -> Result<String> {
            Err(AppError::SessionLost("tab closed".into()))
        }
    }

    #[test]
    fn test_fixture_page_source() {
        let page = FixedPage("<html><body>93456</body></html>");
        assert!(page.content().unwrap().contains("93456"));
    }

    #[test]
    fn test_dead_page_source_reports_session_lost() {
        let err = DeadPage.content().unwrap_err();
        assert!(matches!(err, AppError::SessionLost(_)));
        assert!(err.is_fatal());
    }
}
