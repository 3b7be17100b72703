//! HTML rendering of a [`View`].
//!
//! Pages are plain server-rendered HTML. Form values and notices pass through
//! [`escape`]; the article is rendered from markdown by [`markdown_to_html`],
//! which never lets raw HTML or script URLs through. The generating page
//! refreshes itself every [`REFRESH_SECONDS`] until the result lands.

use std::fmt::Write;

use newsroom::{ArticleForm, ClickCount, Notice, NoticeLevel, ResultPane, View, WordLimit, MAX_LINKS};
use pulldown_cmark::{html as markdown_html, Event, Options, Parser, Tag};

/// Page title.
pub const TITLE: &str = "AI Journalist";
/// Text under the title.
pub const CAPTION: &str = "Generate high-quality articles with AI Journalist by researching, writing, and editing articles using GPT-4o.";
/// Shown in the result pane before anything has been generated.
pub const PLACEHOLDER_TEXT: &str = "Your generated article will be displayed here.";
/// Illustration above [`PLACEHOLDER_TEXT`]: a folded newspaper.
const PLACEHOLDER_IMAGE: &str = r##"<svg width="350" height="220" viewBox="0 0 350 220" role="img" aria-label="Newspaper" xmlns="http://www.w3.org/2000/svg">
<rect x="40" y="20" width="270" height="180" rx="10" fill="#f6f8fa" stroke="#d1d9e0" stroke-width="3"/>
<rect x="65" y="42" width="220" height="22" rx="4" fill="#59636e"/>
<rect x="65" y="80" width="95" height="70" rx="4" fill="#d1d9e0"/>
<rect x="175" y="82" width="110" height="8" rx="3" fill="#afb8c1"/>
<rect x="175" y="100" width="110" height="8" rx="3" fill="#afb8c1"/>
<rect x="175" y="118" width="110" height="8" rx="3" fill="#afb8c1"/>
<rect x="175" y="136" width="80" height="8" rx="3" fill="#afb8c1"/>
<rect x="65" y="164" width="220" height="8" rx="3" fill="#afb8c1"/>
</svg>"##;
/// Shown while an article is being generated.
pub const PROGRESS_TEXT: &str = "Good things take time, and we're making sure it's perfect for you!";
/// Auto-refresh interval of the generating page.
pub const REFRESH_SECONDS: u32 = 2;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1200px; padding: 1.5rem; color: #1f2328; }
h1 { margin-bottom: 0.2rem; }
.caption { color: #59636e; margin-top: 0; }
.columns { display: flex; gap: 1.5rem; align-items: flex-start; }
.panel { flex: 1; border: 1px solid #d1d9e0; border-radius: 0.5rem; padding: 1rem 1.25rem; }
.login { max-width: 360px; margin: 4rem auto; }
label { display: block; margin: 0.8rem 0 0.3rem; }
input[type=text], input[type=password], input[type=url], input[type=number] { width: 100%; box-sizing: border-box; padding: 0.4rem; }
.notice { padding: 0.6rem 0.8rem; border-radius: 0.4rem; margin: 0.8rem 0; }
.notice.success { background: #dafbe1; }
.notice.error { background: #ffebe9; }
.article { line-height: 1.5; }
.article table { border-collapse: collapse; }
.article td, .article th { border: 1px solid #d1d9e0; padding: 0.2rem 0.5rem; }
.placeholder { text-align: center; margin: 2rem auto; }
.muted { color: #59636e; }
.topbar { display: flex; justify-content: space-between; align-items: center; }
"#;

const LINK_TOGGLE_SCRIPT: &str = r#"
function syncLinks() {
  var yes = document.getElementById('use_links_yes').checked;
  document.getElementById('links').style.display = yes ? '' : 'none';
  var count = parseInt(document.getElementById('num_links').value, 10) || 1;
  for (var i = 1; i <= 5; i++) {
    document.getElementById('slot_' + i).style.display = i <= count ? '' : 'none';
  }
}
function copyArticle() {
  var text = document.getElementById('article_source').value;
  navigator.clipboard.writeText(text).then(function () {
    document.getElementById('copy').innerText = 'Copied!';
  });
}
document.addEventListener('DOMContentLoaded', syncLinks);
"#;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders article markdown to HTML.
///
/// Raw HTML in the source is shown as text, and link or image targets with a
/// scheme other than `http`, `https` or `mailto` are replaced by `#`.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: "#".into(),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: "#".into(),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    markdown_html::push_html(&mut out, events);
    out
}

fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    let Some(colon) = url.find(':') else {
        return true;
    };
    let scheme = &url[..colon];
    // A colon after a path, query or fragment separator is not a scheme.
    scheme.contains(['/', '?', '#'])
        || matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https" | "mailto")
}

/// Renders the full page for `view`.
pub fn page(view: &View) -> String {
    let refresh = matches!(
        view,
        View::Desk {
            pane: ResultPane::Generating,
            ..
        }
    );

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    if refresh {
        let _ = writeln!(html, "<meta http-equiv=\"refresh\" content=\"{REFRESH_SECONDS}\">");
    }
    let _ = writeln!(html, "<title>{TITLE}</title>\n<style>{STYLE}</style>");
    let _ = writeln!(html, "<script>{LINK_TOGGLE_SCRIPT}</script>\n</head>\n<body>");

    match view {
        View::Login { notice } => login(&mut html, notice.as_ref()),
        View::Desk {
            form,
            counter,
            pane,
            notice,
        } => desk(&mut html, form, *counter, pane, notice.as_ref()),
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn login(html: &mut String, notice: Option<&Notice>) {
    html.push_str("<div class=\"panel login\">\n<h1>Login</h1>\n");
    notice_block(html, notice);
    html.push_str(concat!(
        "<form method=\"post\" action=\"/login\">\n",
        "<label for=\"username\">Username</label>\n",
        "<input type=\"text\" id=\"username\" name=\"username\" autocomplete=\"username\">\n",
        "<label for=\"password\">Password</label>\n",
        "<input type=\"password\" id=\"password\" name=\"password\" autocomplete=\"current-password\">\n",
        "<p><button type=\"submit\">Login</button></p>\n",
        "</form>\n</div>\n",
    ));
}

fn desk(
    html: &mut String,
    form: &ArticleForm,
    counter: ClickCount,
    pane: &ResultPane,
    notice: Option<&Notice>,
) {
    let _ = writeln!(
        html,
        "<div class=\"topbar\"><div><h1>{TITLE} 🗞️</h1><p class=\"caption\">{CAPTION}</p></div>"
    );
    html.push_str("<form method=\"post\" action=\"/logout\"><button type=\"submit\">Logout</button></form></div>\n");
    notice_block(html, notice);

    html.push_str("<div class=\"columns\">\n<div class=\"panel\">\n<h2>Input &amp; Configuration</h2>\n");
    input_form(html, form, pane);
    let _ = writeln!(
        html,
        "<p class=\"muted\">Articles requested this session: {counter}</p>\n</div>"
    );

    html.push_str("<div class=\"panel\">\n");
    result_pane(html, pane);
    html.push_str("</div>\n</div>\n");
}

fn input_form(html: &mut String, form: &ArticleForm, pane: &ResultPane) {
    let slots = form.links.len().clamp(1, MAX_LINKS);
    let (yes, no) = if form.wants_links {
        (" checked", "")
    } else {
        ("", " checked")
    };

    html.push_str("<form method=\"post\" action=\"/generate\">\n");
    let _ = writeln!(
        html,
        "<label for=\"topic\">What do you want the AI journalist to write an article on?</label>\n\
         <input type=\"text\" id=\"topic\" name=\"topic\" placeholder=\"E.g: Emergence of AI and LLMs.\" value=\"{}\">",
        escape(&form.topic)
    );
    let _ = writeln!(
        html,
        "<label for=\"word_limit\">How long should be your article? <output id=\"word_limit_value\">{limit}</output> words</label>\n\
         <input type=\"range\" id=\"word_limit\" name=\"word_limit\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{limit}\" \
         oninput=\"document.getElementById('word_limit_value').value = this.value\">",
        limit = form.word_limit,
        min = WordLimit::MIN,
        max = WordLimit::MAX,
        step = WordLimit::STEP,
    );
    let _ = writeln!(
        html,
        "<label>Do you want to provide reference links?</label>\n\
         <label><input type=\"radio\" id=\"use_links_no\" name=\"use_links\" value=\"No\" onchange=\"syncLinks()\"{no}> No</label>\n\
         <label><input type=\"radio\" id=\"use_links_yes\" name=\"use_links\" value=\"Yes\" onchange=\"syncLinks()\"{yes}> Yes</label>"
    );

    html.push_str("<div id=\"links\">\n");
    let _ = writeln!(
        html,
        "<label for=\"num_links\">How many links do you want to provide?</label>\n\
         <input type=\"number\" id=\"num_links\" name=\"num_links\" min=\"1\" max=\"{MAX_LINKS}\" step=\"1\" value=\"{slots}\" \
         oninput=\"syncLinks()\" title=\"These links will be used to curate your news article.\">"
    );
    for slot in 1..=MAX_LINKS {
        let value = form.links.get(slot - 1).map(String::as_str).unwrap_or("");
        let _ = writeln!(
            html,
            "<div id=\"slot_{slot}\"><label for=\"link_{slot}\">Enter reference link {slot}</label>\
             <input type=\"url\" id=\"link_{slot}\" name=\"link_{slot}\" value=\"{}\"></div>",
            escape(value)
        );
    }
    html.push_str("</div>\n");

    let disabled = if matches!(pane, ResultPane::Generating) {
        " disabled"
    } else {
        ""
    };
    let _ = writeln!(
        html,
        "<p><button type=\"submit\"{disabled}>Generate Article</button></p>\n</form>"
    );
}

fn result_pane(html: &mut String, pane: &ResultPane) {
    match pane {
        ResultPane::Placeholder => {
            let _ = writeln!(
                html,
                "<figure class=\"placeholder\">{PLACEHOLDER_IMAGE}<figcaption class=\"muted\">{PLACEHOLDER_TEXT}</figcaption></figure>"
            );
        }
        ResultPane::Generating => {
            let _ = writeln!(html, "<p>⏳ {PROGRESS_TEXT}</p>");
        }
        ResultPane::Article(article) => {
            let _ = writeln!(
                html,
                "<div id=\"article\" class=\"article\">{}</div>\n\
                 <textarea id=\"article_source\" hidden readonly>{}</textarea>\n\
                 <p><button type=\"button\" id=\"copy\" onclick=\"copyArticle()\">Copy to clipboard</button></p>",
                markdown_to_html(article.as_str()),
                escape(article.as_str())
            );
        }
    }
}

fn notice_block(html: &mut String, notice: Option<&Notice>) {
    if let Some(notice) = notice {
        let class = match notice.level {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(
            html,
            "<div class=\"notice {class}\" role=\"status\">{}</div>",
            escape(&notice.message)
        );
    }
}
