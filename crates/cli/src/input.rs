//! Line protocol read from stdin by `keypad run`.

use device::KeyEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Key(KeyEvent),
    /// Press immediately followed by release.
    Tap(u8),
    Reload,
    Show,
    Wait(u64),
    Quit,
    Blank,
}

pub fn parse_line(line: &str) -> anyhow::Result<Line> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(Line::Blank);
    };

    let parsed = match first.to_ascii_lowercase().as_str() {
        "press" | "p" => Line::Key(KeyEvent::pressed(parse_key(words.next())?)),
        "release" | "r" => Line::Key(KeyEvent::released(parse_key(words.next())?)),
        "tap" | "t" => Line::Tap(parse_key(words.next())?),
        "reload" => Line::Reload,
        "show" => Line::Show,
        "wait" => {
            let raw = words
                .next()
                .ok_or_else(|| anyhow::anyhow!("wait needs a duration in ms"))?;
            Line::Wait(raw.parse()?)
        }
        "quit" | "exit" => Line::Quit,
        _ => Line::Tap(parse_key(Some(first))?),
    };

    if let Some(extra) = words.next() {
        anyhow::bail!("unexpected argument: {extra}");
    }
    Ok(parsed)
}

fn parse_key(raw: Option<&str>) -> anyhow::Result<u8> {
    let raw = raw.ok_or_else(|| anyhow::anyhow!("missing key index"))?;
    let key: u8 = raw
        .parse()
        .map_err(|_| anyhow::anyhow!("not a key index: {raw}"))?;
    if !app_core::keys::is_valid(key) {
        anyhow::bail!("key {key} is outside the 4x4 grid");
    }
    Ok(key)
}
