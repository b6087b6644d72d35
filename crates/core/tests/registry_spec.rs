// These tests mutate the process-wide registry, so they live in their
// own test binary and serialize on a local lock.

use std::sync::{Arc, Mutex};

use linkscan_core::{
    find, register_custom_protocol, register_plugin, register_token_plugin, reset, test, Error,
    Plugin, TokenPlugin, TokenTag,
};

static LOCK: Mutex<()> = Mutex::new(());

fn guard() -> std::sync::MutexGuard<'static, ()> {
    let g = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset();
    g
}

#[test]
fn custom_protocol_registration_enables_matches() {
    let _g = guard();
    assert!(find("open steam://run/440 now", None).is_empty());

    register_custom_protocol("steam", true).expect("register");
    let matches = find("open steam://run/440 now", None);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, "steam");
    assert_eq!(matches[0].value, "steam://run/440");
    assert_eq!(matches[0].href, "steam://run/440");
    assert!(test("steam://run/440", Some("steam")));
    reset();
}

#[test]
fn colon_only_custom_schemes() {
    let _g = guard();
    register_custom_protocol("tel", false).expect("register");
    let matches = find("call tel:5551234 today", None);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, "tel");
    assert_eq!(matches[0].value, "tel:5551234");
    reset();
}

#[test]
fn slash_schemes_reject_bare_colons() {
    let _g = guard();
    register_custom_protocol("steam", true).expect("register");
    assert!(find("steam:run", None).is_empty());
    reset();
}

#[test]
fn shared_prefix_schemes_coexist() {
    let _g = guard();
    register_custom_protocol("steam", true).expect("register");
    register_custom_protocol("steamworks", true).expect("register");
    assert_eq!(find("steam://a", None)[0].kind, "steam");
    assert_eq!(find("steamworks://b", None)[0].kind, "steamworks");
    // An extension of neither keyword is a plain word.
    assert!(find("steamw://c", None).is_empty());
    reset();
}

#[test]
fn reregistration_is_a_noop() {
    let _g = guard();
    register_custom_protocol("steam", true).expect("register");
    register_custom_protocol("steam", false).expect("re-register");
    register_custom_protocol("STEAM", true).expect("case-folded re-register");
    // First registration wins: `://` is still required.
    assert!(find("steam:run", None).is_empty());
    assert_eq!(find("steam://run", None).len(), 1);
    reset();
}

#[test]
fn invalid_scheme_names_are_rejected() {
    let _g = guard();
    for bad in ["x", "9live", "-steam", "ste am", "st:eam", ""] {
        match register_custom_protocol(bad, true) {
            Err(Error::InvalidScheme(name)) => assert_eq!(name, bad),
            other => panic!("expected InvalidScheme for {:?}, got {:?}", bad, other),
        }
    }
    reset();
}

#[test]
fn hyphenated_schemes_are_allowed() {
    let _g = guard();
    register_custom_protocol("web-cal", false).expect("register");
    let matches = find("web-cal:event-42", None);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, "web-cal");
    // A partial keyword falls back to plain words around the hyphen.
    assert!(find("web-ca:event", None).is_empty());
    reset();
}

#[test]
fn plugins_require_registered_dependencies() {
    let _g = guard();
    let orphan = Plugin {
        name: "needs-base".to_string(),
        requires: vec!["base".to_string()],
        install: Arc::new(|_| {}),
    };
    match register_plugin(orphan) {
        Err(Error::UnknownPluginDependency { plugin, missing }) => {
            assert_eq!(plugin, "needs-base");
            assert_eq!(missing, "base");
        }
        other => panic!("expected UnknownPluginDependency, got {:?}", other),
    }

    register_plugin(Plugin {
        name: "base".to_string(),
        requires: Vec::new(),
        install: Arc::new(|_| {}),
    })
    .expect("register base");
    register_plugin(Plugin {
        name: "needs-base".to_string(),
        requires: vec!["base".to_string()],
        install: Arc::new(|_| {}),
    })
    .expect("dependency satisfied");
    reset();
}

#[test]
fn token_plugins_extend_the_scanner() {
    let _g = guard();
    register_token_plugin(TokenPlugin {
        name: "acme-scheme".to_string(),
        requires: Vec::new(),
        install: Arc::new(|builder| {
            builder.add_keyword("acme", TokenTag::Scheme);
        }),
    })
    .expect("register");
    let matches = find("ping acme:thing now", None);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, "url");
    assert_eq!(matches[0].value, "acme:thing");
    reset();
}

#[test]
fn reset_clears_schemes_and_plugins() {
    let _g = guard();
    register_custom_protocol("steam", true).expect("register");
    assert_eq!(find("steam://run", None).len(), 1);
    reset();
    assert!(find("steam://run", None).is_empty());
}
