// Minimal HTML to plain text conversion, just enough for indexing: tags
// turn into whitespace, script and style bodies and comments disappear,
// and the common entities are decoded. Attribute values containing '>' are
// not handled; indexable corpora escape them.

/// Reduces an HTML document to its visible text.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        decode_entities_into(&rest[..lt], &mut out);
        out.push(' ');
        let tail = &rest[lt..];

        if let Some(after) = tail.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                // An unterminated comment swallows the remainder.
                None => return out,
            };
            continue;
        }

        match tail.find('>') {
            Some(gt) => {
                let name = tag_name(&tail[1..gt]);
                rest = &tail[gt + 1..];
                if name.eq_ignore_ascii_case("script") {
                    rest = skip_element(rest, "script");
                } else if name.eq_ignore_ascii_case("style") {
                    rest = skip_element(rest, "style");
                }
            }
            None => return out,
        }
    }

    decode_entities_into(rest, &mut out);
    out
}

fn tag_name(tag: &str) -> &str {
    tag.trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .next()
        .unwrap_or("")
}

// Skips past the matching close tag, case-insensitively. Script and style
// bodies may contain '<' freely, so scanning for the close tag is the only
// safe way out.
fn skip_element<'a>(rest: &'a str, name: &str) -> &'a str {
    let closing = format!("</{}", name);
    match find_ignore_ascii_case(rest, &closing) {
        Some(at) => {
            let after = &rest[at..];
            match after.find('>') {
                Some(gt) => &after[gt + 1..],
                None => "",
            }
        }
        None => "",
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    for at in 0..=haystack.len() - needle.len() {
        if let Some(window) = haystack.get(at..at + needle.len()) {
            if window.eq_ignore_ascii_case(needle) {
                return Some(at);
            }
        }
    }
    None
}

fn decode_entities_into(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_entity(tail) {
            Some((ch, used)) => {
                out.push(ch);
                rest = &tail[used..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
}

// `entity` starts with '&'. Returns the decoded character and how many
// bytes the entity spanned, or `None` to emit the ampersand literally.
fn decode_entity(entity: &str) -> Option<(char, usize)> {
    let semi = entity.find(';')?;
    if semi > 9 {
        return None;
    }

    let body = &entity[1..semi];
    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(html: &str) -> Vec<String> {
        strip_tags(html)
            .split_whitespace()
            .map(String::from)
            .collect()
    }

    #[test]
    fn tags_separate_words() {
        assert_eq!(words("<p>Casa<br/>verde</p>"), vec!["Casa", "verde"]);
        assert_eq!(
            words("<a href=\"x\">um</a> <b>dois</b>"),
            vec!["um", "dois"]
        );
    }

    #[test]
    fn script_and_style_bodies_are_dropped() {
        let html = "<script>var a = '<q>';</script>Casa<style>p { color: red }</style>";
        assert_eq!(words(html), vec!["Casa"]);
        assert_eq!(words("<SCRIPT>x</SCRIPT>ok"), vec!["ok"]);
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(words("antes<!-- oculto -->depois"), vec!["antes", "depois"]);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(strip_tags("R&amp;D"), "R&D");
        assert_eq!(strip_tags("&lt;3"), "<3");
        assert_eq!(strip_tags("&#39;ok&#39;"), "'ok'");
        assert_eq!(strip_tags("n&#xE3;o"), "não");
        assert_eq!(strip_tags("a &sem; b"), "a &sem; b");
    }

    #[test]
    fn truncated_markup_never_panics() {
        assert_eq!(words("Casa <b"), vec!["Casa"]);
        assert_eq!(words("Casa <!-- sem fim"), vec!["Casa"]);
        assert_eq!(words("<script>sem fim"), Vec::<String>::new());
    }
}
