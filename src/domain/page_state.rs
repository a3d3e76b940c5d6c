use std::fmt;

/// Classification of a navigated page. Computed fresh after every navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Ok,
    AccessDenied,
    Challenge,
    ServerError,
}

impl PageState {
    /// Whether extraction may proceed on a page in this state.
    pub fn is_extractable(self) -> bool {
        matches!(self, PageState::Ok | PageState::AccessDenied)
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PageState::Ok => "ok",
            PageState::AccessDenied => "access-denied",
            PageState::Challenge => "challenge",
            PageState::ServerError => "server-error",
        };
        f.write_str(s)
    }
}
