//! Decoding of `application/x-www-form-urlencoded` request bodies into
//! session events.

use std::collections::HashMap;

use newsroom::{ArticleForm, SessionEvent, MAX_LINKS};

/// Decodes a form body. When a field repeats, the first value wins.
fn fields(body: &[u8]) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for (name, value) in url::form_urlencoded::parse(body) {
        fields.entry(name.into_owned()).or_insert_with(|| value.into_owned());
    }
    fields
}

/// `POST /login` body → [`SessionEvent::LoginSubmit`]. Missing fields are
/// treated as empty.
pub fn login_event(body: &[u8]) -> SessionEvent {
    let mut fields = fields(body);
    SessionEvent::LoginSubmit {
        username: fields.remove("username").unwrap_or_default(),
        password: fields.remove("password").unwrap_or_default(),
    }
}

/// `POST /generate` body → [`ArticleForm`].
///
/// `use_links` selects reference links only when it is exactly `Yes`. The
/// `link_1 ..= link_{num_links}` fields are read in order, with missing slots
/// left empty so validation can report them. `num_links` is capped one above
/// [`MAX_LINKS`], which is enough for validation to reject it without letting a
/// request size the allocation. A missing or malformed `word_limit` becomes
/// `0` and is rejected by validation.
pub fn article_form(body: &[u8]) -> ArticleForm {
    let mut fields = fields(body);

    let word_limit = fields
        .get("word_limit")
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(0);
    let wants_links = fields.get("use_links").map(String::as_str) == Some("Yes");
    let num_links = fields
        .get("num_links")
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .min(MAX_LINKS + 1);

    let links = (1..=num_links)
        .map(|slot| fields.remove(&format!("link_{slot}")).unwrap_or_default())
        .collect();

    ArticleForm {
        topic: fields.remove("topic").unwrap_or_default(),
        word_limit,
        wants_links,
        links,
    }
}
