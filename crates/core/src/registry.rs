use std::sync::{Arc, OnceLock, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Error;
use crate::parser::{Parser, ParserBuilder};
use crate::scanner::{Scanner, ScannerBuilder};
use crate::token::Groups;

#[derive(Debug, Clone)]
pub struct CustomScheme {
    pub name: String,
    // `://` required (like http), or a bare colon (like mailto)
    pub requires_slashes: bool,
}

impl CustomScheme {
    // Flags per the scheme's shape: hyphenated names are only
    // domain-shaped, letter-only names are plain ASCII words, a digit
    // pushes the name to asciinumeric.
    pub(crate) fn groups(&self) -> Groups {
        let base = if self.requires_slashes {
            Groups::SLASHSCHEME
        } else {
            Groups::SCHEME
        };
        let shape = if self.name.contains('-') {
            Groups::DOMAIN
        } else if !self.name.chars().any(|c| c.is_ascii_alphabetic()) {
            Groups::NUMERIC
        } else if self.name.chars().any(|c| c.is_ascii_digit()) {
            Groups::ASCIINUMERIC
        } else {
            Groups::ASCII
        };
        base.union(shape)
    }
}

pub struct Plugin {
    pub name: String,
    pub requires: Vec<String>,
    pub install: Arc<dyn Fn(&mut ParserBuilder) + Send + Sync>,
}

pub struct TokenPlugin {
    pub name: String,
    pub requires: Vec<String>,
    pub install: Arc<dyn Fn(&mut ScannerBuilder) + Send + Sync>,
}

pub(crate) struct Machines {
    pub scanner: Scanner,
    pub parser: Parser,
}

#[derive(Default)]
struct Registry {
    // kept sorted by name so shared scheme prefixes collapse into the
    // trie deterministically
    schemes: Vec<CustomScheme>,
    plugins: Vec<Plugin>,
    token_plugins: Vec<TokenPlugin>,
    machines: Option<Arc<Machines>>,
}

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::default()));

fn scheme_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$").expect("scheme name regex"))
}

pub(crate) fn is_valid_scheme(name: &str) -> bool {
    name.len() >= 2 && scheme_name_re().is_match(name)
}

// Registration drops the cached snapshot; the next scan rebuilds both
// machines and publishes a fresh pair behind an Arc. Readers clone the
// Arc at call entry, so scans in flight keep the graph they started on
// even across a re-registration.
pub(crate) fn machines() -> Arc<Machines> {
    {
        let reg = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
        if let Some(machines) = &reg.machines {
            return Arc::clone(machines);
        }
    }
    let mut reg = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    if reg.machines.is_none() {
        let scanner = Scanner::build(&reg.schemes, &reg.token_plugins);
        let parser = Parser::build(&reg.schemes, &reg.plugins);
        reg.machines = Some(Arc::new(Machines { scanner, parser }));
    }
    match &reg.machines {
        Some(machines) => Arc::clone(machines),
        None => unreachable!("snapshot was just built"),
    }
}

// Re-registering an existing scheme is a no-op.
pub fn register_custom_protocol(scheme: &str, requires_slashes: bool) -> Result<(), Error> {
    let name = scheme.to_ascii_lowercase();
    if !is_valid_scheme(&name) {
        return Err(Error::InvalidScheme(scheme.to_string()));
    }
    let mut reg = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    if reg.schemes.iter().any(|s| s.name == name) {
        return Ok(());
    }
    let pos = reg.schemes.partition_point(|s| s.name < name);
    reg.schemes.insert(
        pos,
        CustomScheme {
            name,
            requires_slashes,
        },
    );
    reg.machines = None;
    Ok(())
}

pub fn register_plugin(plugin: Plugin) -> Result<(), Error> {
    let mut reg = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    for required in &plugin.requires {
        if !reg.plugins.iter().any(|p| &p.name == required) {
            return Err(Error::UnknownPluginDependency {
                plugin: plugin.name.clone(),
                missing: required.clone(),
            });
        }
    }
    if let Some(existing) = reg.plugins.iter_mut().find(|p| p.name == plugin.name) {
        *existing = plugin;
    } else {
        reg.plugins.push(plugin);
    }
    reg.machines = None;
    Ok(())
}

pub fn register_token_plugin(plugin: TokenPlugin) -> Result<(), Error> {
    let mut reg = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    for required in &plugin.requires {
        if !reg.token_plugins.iter().any(|p| &p.name == required) {
            return Err(Error::UnknownPluginDependency {
                plugin: plugin.name.clone(),
                missing: required.clone(),
            });
        }
    }
    if let Some(existing) = reg.token_plugins.iter_mut().find(|p| p.name == plugin.name) {
        *existing = plugin;
    } else {
        reg.token_plugins.push(plugin);
    }
    reg.machines = None;
    Ok(())
}

pub fn reset() {
    let mut reg = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    *reg = Registry::default();
}
