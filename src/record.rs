/// Start position used when a record has no FEN tag.
pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// One game record split into its tag pairs and its move text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub tags: Vec<(String, String)>,
    pub movetext: String,
}

fn parse_tag(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    let (name, rest) = inner.split_once(char::is_whitespace)?;
    let quoted = rest.trim().strip_prefix('"')?.strip_suffix('"')?;
    let mut value = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(esc) = chars.next() { value.push(esc); }
        } else {
            value.push(c);
        }
    }
    Some((name.to_string(), value))
}

impl GameRecord {
    /// Reads the first game in `text`. Anything after its move text is ignored.
    pub fn parse(text: &str) -> GameRecord {
        let mut record = GameRecord::default();
        let mut movetext: Vec<&str> = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if movetext.is_empty() {
                if line.is_empty() { continue; }
                if line.starts_with('[') {
                    match parse_tag(line) {
                        Some(tag) => record.tags.push(tag),
                        None => log::warn!("skipping unreadable tag line `{line}`"),
                    }
                    continue;
                }
            } else if line.starts_with('[') {
                break;
            }
            movetext.push(line);
        }
        while movetext.last().is_some_and(|l| l.is_empty()) { movetext.pop(); }
        record.movetext = movetext.join("\n");
        record
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn start_fen(&self) -> String {
        self.tag("FEN").unwrap_or(STARTPOS_FEN).to_string()
    }
}
