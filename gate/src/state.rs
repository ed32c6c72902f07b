//! Gate states and what each one renders.

/// Per-session gate state.
///
/// `Unknown` until the session has been read. `Verified` is terminal for
/// the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Unknown,
    Unverified,
    Verifying,
    Verified,
}

impl GateState {
    pub fn is_verified(&self) -> bool {
        matches!(self, GateState::Verified)
    }
}

/// What the page shows for the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateView {
    /// Session not read yet.
    Loading,
    /// Blocking gate with the challenge widget. `verifying` shows progress.
    Challenge { site_key: String, verifying: bool },
    /// Blocking gate without a widget: no site key is configured.
    SiteKeyMissing,
    /// Protected content.
    Content,
}

impl GateView {
    pub fn is_blocking(&self) -> bool {
        !matches!(self, GateView::Content)
    }
}

/// Shown to the user after a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateNotice {
    /// The server rejected the token.
    VerificationFailed,
    /// The server could not be asked.
    VerificationError,
}
