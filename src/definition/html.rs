//! Text extraction from loosely-formed HTML fragments.
//!
//! The `Questions` blob of a ballot definition is hand-edited HTML that is
//! rarely well formed, so this walker never fails: it splits the input on
//! tags and yields the decoded, whitespace-collapsed text of every non-empty
//! text node in document order. Character references are decoded with
//! `html_escape`.

/// Returns the text nodes of `html` in document order.
pub fn text_fragments(html: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut text = String::new();
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        let after = &rest[lt + 1..];

        if let Some(comment) = after.strip_prefix("!--") {
            flush(&mut text, &mut fragments);
            rest = match comment.find("-->") {
                Some(end) => &comment[end + 3..],
                None => "",
            };
            continue;
        }

        let starts_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?');
        if !starts_tag {
            text.push('<');
            rest = after;
            continue;
        }

        flush(&mut text, &mut fragments);
        let Some(gt) = after.find('>') else {
            rest = "";
            break;
        };
        let tag = &after[..gt];
        rest = &after[gt + 1..];

        let name = tag_name(tag).to_ascii_lowercase();
        if (name == "style" || name == "script") && !tag.ends_with('/') {
            rest = skip_raw_text(rest, &name);
        }
    }

    text.push_str(rest);
    flush(&mut text, &mut fragments);
    fragments
}

fn tag_name(tag: &str) -> &str {
    let tag = tag.trim_start_matches('/');
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(tag.len());
    &tag[..end]
}

/// Skips past the closing tag of a raw-text element such as `<style>`.
fn skip_raw_text<'a>(rest: &'a str, name: &str) -> &'a str {
    let closing = format!("</{name}");
    let lower = rest.to_ascii_lowercase();
    match lower.find(&closing) {
        Some(start) => match rest[start..].find('>') {
            Some(end) => &rest[start + end + 1..],
            None => "",
        },
        None => "",
    }
}

fn flush(text: &mut String, fragments: &mut Vec<String>) {
    let decoded = html_escape::decode_html_entities(text);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        fragments.push(collapsed);
    }
    text.clear();
}
