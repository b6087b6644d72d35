use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::registry;

// (type, value) -> keep; returning false (or panicking) demotes the
// entity to inert text.
pub type ValidateFn = dyn Fn(&str, &str) -> bool + Send + Sync;
pub type FormatFn = dyn Fn(&str) -> String + Send + Sync;

#[derive(Clone)]
pub struct Options {
    pub default_protocol: String,
    pub detect_email: bool,
    pub nl2br: bool,
    pub ignore_tags: Vec<String>,
    pub validate: Option<Arc<ValidateFn>>,
    // Rendering concerns below are exposed verbatim; the core never calls
    // them.
    pub render: Option<Arc<FormatFn>>,
    pub tag_name: Option<String>,
    pub attributes: HashMap<String, String>,
    pub class_name: Option<String>,
    pub target: Option<String>,
    pub rel: Option<String>,
    pub format: Option<Arc<FormatFn>>,
    pub format_href: Option<Arc<FormatFn>>,
    pub truncate: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            default_protocol: "http".to_string(),
            detect_email: true,
            nl2br: false,
            ignore_tags: Vec::new(),
            validate: None,
            render: None,
            tag_name: None,
            attributes: HashMap::new(),
            class_name: None,
            target: None,
            rel: None,
            format: None,
            format_href: None,
            truncate: None,
        }
    }
}

impl Options {
    // Scheme case is cosmetic everywhere else, so fold before validating.
    pub(crate) fn check(&self) -> Result<(), Error> {
        if !registry::is_valid_scheme(&self.default_protocol.to_ascii_lowercase()) {
            return Err(Error::InvalidOptionValue {
                field: "default_protocol",
                value: self.default_protocol.clone(),
            });
        }
        Ok(())
    }
}
