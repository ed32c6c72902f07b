//! Gate state machine.
//!
//! ```text
//! Unknown ──load──▶ Unverified ──token──▶ Verifying ──success──▶ Verified
//!    │                  ▲                     │
//!    └──load (session)──┼──────────▶ Verified │
//!                       └─────failure─────────┘
//! ```

use tracing::{debug, warn};

use crate::client::GateVerifyClient;
use crate::config::GateConfig;
use crate::error::GateError;
use crate::session::{BrowserSession, SessionStorage};
use crate::state::{GateNotice, GateState, GateView};
use crate::widget::ChallengeWidget;

const VERIFIED_VALUE: &str = "true";

pub struct GateSessionController<W, S = BrowserSession> {
    config: GateConfig,
    session: S,
    widget: W,
    state: GateState,
    token: Option<String>,
    notice: Option<GateNotice>,
}

impl<W: ChallengeWidget, S: SessionStorage> GateSessionController<W, S> {
    pub fn new(config: GateConfig, session: S, widget: W) -> Self {
        Self {
            config,
            session,
            widget,
            state: GateState::Unknown,
            token: None,
            notice: None,
        }
    }

    /// Read the session once. Later calls return the current state unchanged.
    pub fn load(&mut self) -> GateState {
        if self.state == GateState::Unknown {
            let verified = self
                .session
                .get(&self.config.storage_key)
                .is_some_and(|v| v == VERIFIED_VALUE);
            self.state = if verified {
                GateState::Verified
            } else {
                GateState::Unverified
            };
            debug!(state = ?self.state, "gate session loaded");
        }
        self.state
    }

    /// Widget callback. `None` means the response expired and is dropped.
    ///
    /// Returns the token to send to the server when a verification starts.
    pub fn on_token(&mut self, token: Option<String>) -> Option<String> {
        match token {
            None => {
                self.token = None;
                None
            }
            Some(token) => match self.begin_verification(token.clone()) {
                Ok(()) => Some(token),
                Err(e) => {
                    debug!(error = %e, "ignoring challenge token");
                    None
                }
            },
        }
    }

    pub fn begin_verification(&mut self, token: String) -> Result<(), GateError> {
        if self.state != GateState::Unverified {
            return Err(GateError::InvalidTransition {
                from: self.state,
                action: "begin verification",
            });
        }
        self.token = Some(token);
        self.notice = None;
        self.state = GateState::Verifying;
        Ok(())
    }

    /// Apply the server's verdict. `Ok(true)` opens the gate for the rest of
    /// the session; anything else resets the widget for another attempt.
    pub fn finish_verification(
        &mut self,
        outcome: Result<bool, GateError>,
    ) -> Result<GateState, GateError> {
        if self.state != GateState::Verifying {
            return Err(GateError::InvalidTransition {
                from: self.state,
                action: "finish verification",
            });
        }

        match outcome {
            Ok(true) => {
                self.session.set(&self.config.storage_key, VERIFIED_VALUE);
                self.token = None;
                self.state = GateState::Verified;
                debug!("gate verified for this session");
            }
            Ok(false) => {
                debug!("gate token rejected");
                self.fail(GateNotice::VerificationFailed);
            }
            Err(e) => {
                warn!(error = %e, "gate verification request failed");
                self.fail(GateNotice::VerificationError);
            }
        }
        Ok(self.state)
    }

    /// Start a verification with `token`, ask `client`, and apply the verdict.
    pub async fn verify_with<C>(&mut self, client: &C, token: String) -> GateState
    where
        C: GateVerifyClient + ?Sized,
    {
        let Some(token) = self.on_token(Some(token)) else {
            return self.state;
        };
        let outcome = client.verify(&token).await;
        self.finish_verification(outcome).unwrap_or(self.state)
    }

    fn fail(&mut self, notice: GateNotice) {
        self.widget.reset();
        self.token = None;
        self.notice = Some(notice);
        self.state = GateState::Unverified;
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn view(&self) -> GateView {
        match self.state {
            GateState::Unknown => GateView::Loading,
            GateState::Verified => GateView::Content,
            GateState::Unverified | GateState::Verifying => match self.config.site_key() {
                Some(site_key) => GateView::Challenge {
                    site_key: site_key.to_string(),
                    verifying: self.state == GateState::Verifying,
                },
                None => GateView::SiteKeyMissing,
            },
        }
    }

    /// The current token, if a verification is in flight.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn notice(&self) -> Option<GateNotice> {
        self.notice
    }

    /// Take the pending notice so it is shown once.
    pub fn take_notice(&mut self) -> Option<GateNotice> {
        self.notice.take()
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// End this page's controller, keeping the session for the next page.
    pub fn into_session(self) -> S {
        self.session
    }
}
