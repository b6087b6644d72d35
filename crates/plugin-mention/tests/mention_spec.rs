use std::sync::Mutex;

use linkscan_core::find;

static LOCK: Mutex<()> = Mutex::new(());

fn setup() -> std::sync::MutexGuard<'static, ()> {
    let guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    linkscan_core::reset();
    linkscan_plugin_mention::register().expect("register mention plugin");
    guard
}

#[test]
fn finds_mentions() {
    let _g = setup();
    let matches = find("thanks @alice!", None);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, "mention");
    assert_eq!(matches[0].value, "@alice");
}

#[test]
fn team_mentions_take_slashes() {
    let _g = setup();
    assert_eq!(find("cc @org/team-leads", None)[0].value, "@org/team-leads");
}

#[test]
fn emails_are_not_mentions() {
    let _g = setup();
    let matches = find("mail alice@example.com", None);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, "email");
}

#[test]
fn bare_at_sign_stays_inert() {
    let _g = setup();
    assert!(find("a @ b", None).is_empty());
}
