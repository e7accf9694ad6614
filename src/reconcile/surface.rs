use serde::{Deserialize, Serialize};

/// Which part of the host site the current location belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Surface {
    Home,
    Watch,
    Other,
}

impl Surface {
    pub fn from_path(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        match path {
            "" | "/" => Surface::Home,
            p if p == "/watch" || p.starts_with("/watch/") => Surface::Watch,
            _ => Surface::Other,
        }
    }
}
