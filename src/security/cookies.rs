use std::{collections::HashMap, sync::Arc};

/// Read access to the cookie jar shared with the rest of the page.
pub trait CookieStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

impl<C: CookieStore> CookieStore for Arc<C> {
    fn get(&self, name: &str) -> Option<String> {
        self.as_ref().get(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCookies {
    cookies: HashMap<String, String>,
}

impl StaticCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Cookie:` header value such as `a=1; b=2`.
    pub fn from_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().trim_matches('"').to_string()))
            })
            .collect();
        Self { cookies }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }
}

impl CookieStore for StaticCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
    }
}
