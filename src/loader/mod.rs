//! Page loading with linear backoff.
//!
//! A [`PageSession`] is the raw capability: navigate to a URL and wait for
//! an element to appear. [`ResilientLoader`] wraps one session and adds the
//! retry ceiling, backoff sleeps, and the post-load throttle.
//!
//! The session is stateful (one active page) and is only ever reached
//! through `&mut`, so loads can never overlap.

mod chrome;

pub use chrome::ChromeSession;

use crate::config::LoaderConfig;
use crate::console::Console;
use crate::error::{LoadError, SessionError};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// A page-loading capability, such as a browser tab.
#[async_trait]
pub trait PageSession: Send {
    /// Navigates to `url` and waits up to `timeout` for an element matching
    /// the CSS selector `awaited`. Returns the rendered page source.
    async fn open(
        &mut self,
        url: &str,
        awaited: &str,
        timeout: Duration,
    ) -> Result<String, SessionError>;

    /// Releases the session. Called once, at the end of a batch.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Sleep before retry number `attempt` (1-based): 15s, 30s, 45s, ...
pub fn backoff_delay(step_sec: u64, attempt: u32) -> Duration {
    Duration::from_secs(step_sec.saturating_mul(u64::from(attempt)))
}

/// Loads pages through a single session, retrying on timeouts.
pub struct ResilientLoader<S> {
    session: S,
    config: LoaderConfig,
    console: Console,
}

impl<S: PageSession> ResilientLoader<S> {
    /// Creates a loader that owns `session`.
    pub fn new(session: S, config: LoaderConfig) -> Self {
        let console = Console::new().with_debug(config.debug);
        Self {
            session,
            config,
            console,
        }
    }

    /// Loads `url` and returns its source once `awaited` is present.
    ///
    /// Timeouts and failed navigations are retried up to `max_retries` times
    /// with a linear backoff. When the ceiling is reached the error is
    /// returned to the caller; other browser failures are returned immediately.
    pub async fn load(&mut self, url: &str, awaited: &str) -> Result<String, LoadError> {
        self.console.debug(&format!("hitting: {}", url));

        let timeout = Duration::from_secs(self.config.timeout_sec);
        let mut retried: u32 = 0;

        loop {
            match self.session.open(url, awaited, timeout).await {
                Ok(source) => {
                    // give the server a break
                    tokio::time::sleep(self.throttle_delay()).await;
                    return Ok(source);
                }
                Err(err @ (SessionError::Timeout | SessionError::Network(_))) => {
                    if retried >= self.config.max_retries {
                        self.console.error(&format!("Giving up on {}: {}", url, err));
                        return Err(LoadError::Timeout {
                            url: url.to_string(),
                            attempts: retried + 1,
                        });
                    }

                    retried += 1;
                    let delay = backoff_delay(self.config.backoff_step_sec, retried);
                    self.console.warning(&format!(
                        "{}! Retrying in {}s (retry {}/{})",
                        err,
                        delay.as_secs(),
                        retried,
                        self.config.max_retries
                    ));
                    tokio::time::sleep(delay).await;
                }
                Err(SessionError::Browser(message)) => {
                    return Err(LoadError::Session(message));
                }
            }
        }
    }

    /// Closes the underlying session.
    pub async fn close(&mut self) -> Result<(), LoadError> {
        self.session
            .close()
            .await
            .map_err(|e| LoadError::Session(e.to_string()))
    }

    /// Pause after a successful load, uniform in `[jitter_min, jitter_max)`.
    fn throttle_delay(&self) -> Duration {
        let (min, max) = (self.config.jitter_min_sec, self.config.jitter_max_sec);
        if max <= min {
            return Duration::from_secs_f64(min.max(0.0));
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(min..max))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory session for tests.

    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// Serves scripted responses per URL and records every call.
    ///
    /// Each URL has a queue of outcomes; the last one repeats once the queue
    /// is down to a single entry. Unknown URLs time out.
    #[derive(Default)]
    pub struct ScriptedSession {
        pages: HashMap<String, VecDeque<Result<String, SessionError>>>,
        calls: Arc<Mutex<Vec<String>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl ScriptedSession {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues an outcome for `url`.
        pub fn respond(mut self, url: &str, outcome: Result<String, SessionError>) -> Self {
            self.pages
                .entry(url.to_string())
                .or_default()
                .push_back(outcome);
            self
        }

        /// Queues a successful page for `url`.
        pub fn page(self, url: &str, html: &str) -> Self {
            self.respond(url, Ok(html.to_string()))
        }

        /// Shared view of the URLs opened so far.
        pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.calls)
        }

        /// Shared flag set when the session is closed.
        pub fn closed(&self) -> Arc<Mutex<bool>> {
            Arc::clone(&self.closed)
        }
    }

    #[async_trait]
    impl PageSession for ScriptedSession {
        async fn open(
            &mut self,
            url: &str,
            _awaited: &str,
            _timeout: Duration,
        ) -> Result<String, SessionError> {
            self.calls.lock().unwrap().push(url.to_string());
            let Some(queue) = self.pages.get_mut(url) else {
                return Err(SessionError::Timeout);
            };
            if queue.len() > 1 {
                queue.pop_front().unwrap_or(Err(SessionError::Timeout))
            } else {
                queue.front().cloned().unwrap_or(Err(SessionError::Timeout))
            }
        }

        async fn close(&mut self) -> Result<(), SessionError> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    /// Loader config with no throttle pause.
    pub fn quiet_config(max_retries: u32) -> LoaderConfig {
        LoaderConfig {
            max_retries,
            jitter_min_sec: 0.0,
            jitter_max_sec: 0.0,
            ..LoaderConfig::default()
        }
    }
}
