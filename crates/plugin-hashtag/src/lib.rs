use std::sync::Arc;

use linkscan_core::{register_plugin, EntityKind, Error, Plugin, TokenGroup, TokenTag};

pub const NAME: &str = "hashtag";

// Registering twice replaces the previous installation, so this is safe
// to call from multiple setup paths.
pub fn register() -> Result<(), Error> {
    register_plugin(Plugin {
        name: NAME.to_string(),
        requires: Vec::new(),
        install: Arc::new(|builder| {
            let start = builder.start();
            let gate = builder.add_literal(start, TokenTag::Pound, None);
            let body = builder.add_class(gate, TokenGroup::AlphaNumeric, None);
            builder.set_accepting(body, EntityKind::Custom(NAME.to_string()));
            builder.add_class(body, TokenGroup::AlphaNumeric, Some(body));
            builder.add_class(gate, TokenGroup::Emoji, Some(body));
            builder.add_class(body, TokenGroup::Emoji, Some(body));

            // Underscores may join runs but cannot end the tag.
            let joiner = builder.add_literal(body, TokenTag::Underscore, None);
            builder.add_literal(joiner, TokenTag::Underscore, Some(joiner));
            builder.add_class(joiner, TokenGroup::AlphaNumeric, Some(body));
            builder.add_class(joiner, TokenGroup::Emoji, Some(body));
        }),
    })
}
