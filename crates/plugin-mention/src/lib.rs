use std::sync::Arc;

use linkscan_core::{register_plugin, EntityKind, Error, Plugin, TokenGroup, TokenTag};

pub const NAME: &str = "mention";

pub fn register() -> Result<(), Error> {
    register_plugin(Plugin {
        name: NAME.to_string(),
        requires: Vec::new(),
        install: Arc::new(|builder| {
            let start = builder.start();
            let gate = builder.add_literal(start, TokenTag::At, None);
            let body = builder.add_class(gate, TokenGroup::AsciiNumeric, None);
            builder.set_accepting(body, EntityKind::Custom(NAME.to_string()));
            builder.add_class(body, TokenGroup::AsciiNumeric, Some(body));

            // Joiners inside a name; none of them may end the mention.
            let joiner = builder.node();
            builder.add_literal(body, TokenTag::Underscore, Some(joiner));
            builder.add_literal(body, TokenTag::Hyphen, Some(joiner));
            builder.add_literal(joiner, TokenTag::Underscore, Some(joiner));
            builder.add_literal(joiner, TokenTag::Hyphen, Some(joiner));
            builder.add_class(joiner, TokenGroup::AsciiNumeric, Some(body));

            // `@org/team` style sub-names
            let slash = builder.add_literal(body, TokenTag::Slash, None);
            builder.add_class(slash, TokenGroup::AsciiNumeric, Some(body));
        }),
    })
}
