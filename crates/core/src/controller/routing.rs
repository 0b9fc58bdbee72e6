//! View states and the address-bar abstraction.
//!
//! The controller synchronizes document identity with the host's address
//! bar through [`AddressBar`]: `replace` rewrites the current entry without
//! navigation, `push` creates a back-button-visible entry (used only by
//! publish). [`MemoryAddressBar`] is the in-process implementation used by
//! tests and non-browser hosts.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// The linear workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Landing,
    Config,
    Edit,
    Preview,
    Public,
}

impl ViewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewState::Landing => "landing",
            ViewState::Config => "config",
            ViewState::Edit => "edit",
            ViewState::Preview => "preview",
            ViewState::Public => "public",
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landing" => Ok(ViewState::Landing),
            "config" => Ok(ViewState::Config),
            "edit" => Ok(ViewState::Edit),
            "preview" => Ok(ViewState::Preview),
            "public" => Ok(ViewState::Public),
            _ => Err(()),
        }
    }
}

/// The two query parameters the routing context carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteQuery {
    pub id: Option<String>,
    pub view: Option<String>,
}

impl RouteQuery {
    pub fn with_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            view: None,
        }
    }

    pub fn with_id_and_view(id: &str, view: ViewState) -> Self {
        Self {
            id: Some(id.to_string()),
            view: Some(view.as_str().to_string()),
        }
    }

    /// Parse `id=...&view=...` pairs. Unknown keys are ignored.
    pub fn parse(query: &str) -> Self {
        let mut out = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "id" if !value.is_empty() => out.id = Some(value.to_string()),
                "view" if !value.is_empty() => out.view = Some(value.to_string()),
                _ => {}
            }
        }
        out
    }

    /// Render back to a query string, id first.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(id) = &self.id {
            parts.push(format!("id={id}"));
        }
        if let Some(view) = &self.view {
            parts.push(format!("view={view}"));
        }
        parts.join("&")
    }

    /// The `view` parameter as a state, if present and valid.
    pub fn view_state(&self) -> Option<ViewState> {
        self.view.as_deref().and_then(|v| v.parse().ok())
    }
}

/// The host's address bar, as seen by the controller.
pub trait AddressBar: Send + Sync {
    fn current(&self) -> RouteQuery;
    /// Rewrite the current entry. No navigation, no history entry.
    fn replace(&self, query: &RouteQuery);
    /// Navigate: push a new history entry.
    fn push(&self, query: &RouteQuery);
}

/// In-memory address bar with a history stack.
#[derive(Debug, Default)]
pub struct MemoryAddressBar {
    inner: Mutex<AddressState>,
}

#[derive(Debug, Default)]
struct AddressState {
    current: RouteQuery,
    history: Vec<RouteQuery>,
}

impl MemoryAddressBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a given query, as if the page was opened on that URL.
    pub fn starting_at(query: RouteQuery) -> Self {
        Self {
            inner: Mutex::new(AddressState {
                current: query,
                history: Vec::new(),
            }),
        }
    }

    /// Number of pushed history entries (replace does not count).
    pub fn history_len(&self) -> usize {
        self.inner.lock().unwrap().history.len()
    }
}

impl AddressBar for MemoryAddressBar {
    fn current(&self) -> RouteQuery {
        self.inner.lock().unwrap().current.clone()
    }

    fn replace(&self, query: &RouteQuery) {
        self.inner.lock().unwrap().current = query.clone();
    }

    fn push(&self, query: &RouteQuery) {
        let mut state = self.inner.lock().unwrap();
        let previous = std::mem::replace(&mut state.current, query.clone());
        state.history.push(previous);
    }
}
