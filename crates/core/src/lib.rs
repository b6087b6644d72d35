mod charclass;
mod error;
mod fsm;
mod options;
mod parser;
mod registry;
mod scanner;
mod tlds;
mod token;

pub use charclass::CharClass;
pub use error::Error;
pub use fsm::NodeIdx;
pub use options::{FormatFn, Options, ValidateFn};
pub use parser::{Entity, EntityKind, Match, ParserBuilder, TokenKey};
pub use registry::{
    register_custom_protocol, register_plugin, register_token_plugin, reset, CustomScheme, Plugin,
    TokenPlugin,
};
pub use scanner::ScannerBuilder;
pub use token::{Groups, Token, TokenGroup, TokenTag};

pub fn tokenize(text: &str) -> Vec<Entity> {
    let machines = registry::machines();
    let tokens = machines.scanner.scan(text);
    machines.parser.parse(text, &tokens, &Options::default())
}

pub fn tokenize_with(text: &str, options: &Options) -> Result<Vec<Entity>, Error> {
    options.check()?;
    let machines = registry::machines();
    let tokens = machines.scanner.scan(text);
    Ok(machines.parser.parse(text, &tokens, options))
}

pub fn find(text: &str, kind: Option<&str>) -> Vec<Match> {
    collect(tokenize(text), kind)
}

pub fn find_with(text: &str, kind: Option<&str>, options: &Options) -> Result<Vec<Match>, Error> {
    Ok(collect(tokenize_with(text, options)?, kind))
}

// True iff the entire input is a single link entity of the given kind
// (any link kind when kind is None).
pub fn test(text: &str, kind: Option<&str>) -> bool {
    let entities = tokenize(text);
    match entities.as_slice() {
        [entity] => entity.is_link() && kind.map_or(true, |k| entity.kind.name() == k),
        _ => false,
    }
}

fn collect(entities: Vec<Entity>, kind: Option<&str>) -> Vec<Match> {
    entities
        .iter()
        .filter(|e| kind.map_or(true, |k| e.kind.name() == k))
        .filter_map(Match::from_entity)
        .collect()
}
