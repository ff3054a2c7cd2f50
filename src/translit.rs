// 🔤 Pinyin tags
// Book and project names are Chinese; Beancount tags want ASCII.

use pinyin::ToPinyin;

/// Syllable with its tone number at the end, neutral tone written as 5
fn tone3(syllable: &str) -> String {
    let mut s = syllable.replace('ü', "v");
    if !s.ends_with(|c: char| c.is_ascii_digit()) {
        s.push('5');
    }
    s
}

/// Characters Beancount accepts in a tag or link
fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.')
}

/// Replace every character a tag cannot hold with `-`, collapsing repeats and
/// trimming them from both ends. May return an empty string.
pub fn tag_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let c = if is_tag_char(c) { c } else { '-' };
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Transliterate to `-`-joined TONE3 pinyin, e.g. `装修` → `zhuang1-xiu1`.
///
/// Runs of characters without a pinyin reading are kept as one segment, then
/// the result is made tag-safe. Readings are per character: `长沙` comes out
/// as `zhang3-sha1`, so names like that need a `tags` override in the config.
pub fn slug(text: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut run = String::new();

    for c in text.chars() {
        match c.to_pinyin() {
            Some(p) => {
                if !run.is_empty() {
                    segments.push(std::mem::take(&mut run));
                }
                segments.push(tone3(p.with_tone_num_end()));
            }
            None => run.push(c),
        }
    }
    if !run.is_empty() {
        segments.push(run);
    }

    tag_safe(&segments.join("-"))
}
