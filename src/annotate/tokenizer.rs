use crate::error::ParseError;

/// One half-move as written in the move text, before any board validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawPly {
    pub number: u32,
    pub san: String,
    pub annotation: Option<String>,
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

#[derive(Debug, PartialEq, Eq)]
enum Lexeme<'a> {
    MoveNumber { number: u32, black: bool },
    Move(&'a str),
    Comment(&'a str),
    Nag,
    Outcome,
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self { Self { text, pos: 0 } }

    fn next_lexeme(&mut self) -> Result<Option<Lexeme<'a>>, ParseError> {
        // Same whitespace test as the word scan below, so every word is non-empty.
        let rest = &self.text[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        if trimmed.is_empty() { return Ok(None); }
        let bytes = self.text.as_bytes();
        let start = self.pos;
        match bytes[start] {
            b'{' => {
                let body = &self.text[start + 1..];
                let end = body.find('}').ok_or_else(|| ParseError::malformed(None, "unterminated annotation"))?;
                self.pos = start + 1 + end + 1;
                Ok(Some(Lexeme::Comment(&body[..end])))
            }
            b';' => {
                let end = self.text[start..].find('\n').map_or(self.text.len(), |o| start + o);
                self.pos = end;
                Ok(Some(Lexeme::Comment(self.text[start + 1..end].trim_end_matches('\r'))))
            }
            b'}' => Err(ParseError::malformed(None, "unmatched `}`")),
            b'(' | b')' => Err(ParseError::malformed(None, "variations are not supported")),
            _ => {
                let end = self.text[start..]
                    .find(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | ';' | '(' | ')'))
                    .map_or(self.text.len(), |o| start + o);
                let word = &self.text[start..end];
                if word.is_empty() {
                    return Err(ParseError::malformed(None, format!("unexpected character at byte {start}")));
                }
                if RESULTS.contains(&word) {
                    self.pos = end;
                    return Ok(Some(Lexeme::Outcome));
                }
                if word.starts_with('$') {
                    self.pos = end;
                    return Ok(Some(Lexeme::Nag));
                }
                let digits = word.bytes().take_while(u8::is_ascii_digit).count();
                let dots = word[digits..].bytes().take_while(|&b| b == b'.').count();
                if digits > 0 && dots > 0 {
                    let number = word[..digits].parse().map_err(|_| ParseError::malformed(None, format!("move number `{word}` out of range")))?;
                    // "1.e4" carries the move right after the marker
                    self.pos = start + digits + dots;
                    return Ok(Some(Lexeme::MoveNumber { number, black: dots > 1 }));
                }
                self.pos = end;
                Ok(Some(Lexeme::Move(word)))
            }
        }
    }
}

struct Group {
    number: u32,
    black: bool,
    plies: Vec<RawPly>,
}

impl Group {
    fn capacity(&self) -> usize { if self.black { 1 } else { 2 } }

    fn close(self, out: &mut Vec<RawPly>) -> Result<(), ParseError> {
        if self.plies.is_empty() {
            return Err(ParseError::malformed(Some(self.number), "move number without a move"));
        }
        out.extend(self.plies);
        Ok(())
    }
}

/// Split move text into ply tokens, each with the brace annotation that follows it.
pub fn tokenize(movetext: &str) -> Result<Vec<RawPly>, ParseError> {
    let mut lexer = Lexer::new(movetext);
    let mut plies = Vec::new();
    let mut group: Option<Group> = None;

    while let Some(lexeme) = lexer.next_lexeme()? {
        match lexeme {
            Lexeme::MoveNumber { number, black } => {
                if let Some(g) = group.take() { g.close(&mut plies)?; }
                group = Some(Group { number, black, plies: Vec::with_capacity(2) });
            }
            Lexeme::Move(word) => {
                let san = word.trim_end_matches(|c: char| c == '!' || c == '?');
                if san.is_empty() { continue; }
                let Some(g) = group.as_mut() else {
                    return Err(ParseError::malformed(None, format!("move `{san}` before any move number")));
                };
                if g.plies.len() == g.capacity() {
                    return Err(ParseError::malformed(Some(g.number), format!("more than {} moves in one group at `{san}`", g.capacity())));
                }
                g.plies.push(RawPly { number: g.number, san: san.to_string(), annotation: None });
            }
            Lexeme::Comment(text) => {
                let number = group.as_ref().map(|g| g.number);
                let Some(ply) = group.as_mut().and_then(|g| g.plies.last_mut()) else {
                    return Err(ParseError::malformed(number, "annotation without a preceding move"));
                };
                match ply.annotation.as_mut() {
                    Some(prev) => {
                        prev.push_str(", ");
                        prev.push_str(text.trim());
                    }
                    None => ply.annotation = Some(text.to_string()),
                }
            }
            Lexeme::Nag => {}
            Lexeme::Outcome => {
                let rest = movetext[lexer.pos..].trim();
                if !rest.is_empty() {
                    log::warn!("ignoring {} bytes of move text after the game result", rest.len());
                }
                break;
            }
        }
    }
    if let Some(g) = group.take() { g.close(&mut plies)?; }
    log::trace!("tokenized {} plies", plies.len());
    Ok(plies)
}
