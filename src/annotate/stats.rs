use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    Centipawns(i32),
    /// Moves to mate, negative when the side to move is getting mated.
    Mate(i32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depth {
    pub depth: u32,
    pub seldepth: Option<u32>,
}

/// Search statistics attached to one ply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Statistic {
    pub score: Score,
    pub depth: Depth,
    pub nodes: Option<u64>,
    pub elapsed: Duration,
}

/// Layout of the statistics inside one annotation blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Dialect {
    /// `<score> <depth>/<seldepth> <millis> <nodes>`
    Full,
    /// `<score>/<depth>, <seconds>s` (or `<millis>ms`)
    Compact,
    Unrecognized,
    /// The move carried no annotation at all.
    Absent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub dialect: Dialect,
    pub stats: Option<Statistic>,
    pub trailer: Option<String>,
}

impl Annotation {
    fn absent() -> Self { Self { dialect: Dialect::Absent, stats: None, trailer: None } }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("field `{field}` has unparseable value `{value}` in {{{blob}}}")]
pub struct StatisticError {
    pub field: &'static str,
    pub value: String,
    pub blob: String,
}

/// How a trailing unit marker on the node-count field is handled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuffixPolicy {
    /// Digits only.
    Strict,
    /// Drop exactly one trailing non-digit character.
    #[default]
    AnyOneNonDigit,
    /// Drop one trailing character only if it is in the set.
    OneOf(Vec<char>),
}

impl SuffixPolicy {
    pub fn strip<'a>(&self, raw: &'a str) -> &'a str {
        let Some(last) = raw.chars().last() else { return raw };
        if last.is_ascii_digit() { return raw; }
        let drop = match self {
            SuffixPolicy::Strict => false,
            SuffixPolicy::AnyOneNonDigit => true,
            SuffixPolicy::OneOf(set) => set.contains(&last),
        };
        if drop { &raw[..raw.len() - last.len_utf8()] } else { raw }
    }

    pub fn node_count(&self, raw: &str) -> Option<u64> { parse_digits(self.strip(raw)) }
}

impl FromStr for SuffixPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim() {
            "strict" => Ok(SuffixPolicy::Strict),
            "any" => Ok(SuffixPolicy::AnyOneNonDigit),
            other => match other.strip_prefix("oneof:") {
                Some(chars) if !chars.is_empty() => Ok(SuffixPolicy::OneOf(chars.chars().collect())),
                _ => Err(format!("unknown node suffix policy `{other}` (strict | any | oneof:<chars>)")),
            },
        }
    }
}

impl fmt::Display for SuffixPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SuffixPolicy::Strict => write!(f, "strict"),
            SuffixPolicy::AnyOneNonDigit => write!(f, "any"),
            SuffixPolicy::OneOf(set) => write!(f, "oneof:{}", set.iter().collect::<String>()),
        }
    }
}

enum Shape<'a> {
    Full { fields: [&'a str; 4], trailer: Option<&'a str> },
    Compact { score_depth: &'a str, time: &'a str, trailer: Option<&'a str> },
    Unrecognized,
}

fn non_empty(s: Option<&str>) -> Option<&str> { s.map(str::trim).filter(|t| !t.is_empty()) }

fn starts_like_score(s: &str) -> bool {
    s.chars().next().is_some_and(|c| matches!(c, '+' | '-' | '#' | 'M') || c.is_ascii_digit())
}

fn classify(blob: &str) -> Shape<'_> {
    let mut segments = blob.splitn(2, ',');
    let head = segments.next().unwrap_or("");
    let fields: Vec<&str> = head.split_whitespace().collect();
    if let [score, depth, time, nodes] = fields[..] {
        if starts_like_score(score) && depth.contains('/') {
            return Shape::Full { fields: [score, depth, time, nodes], trailer: non_empty(segments.next()) };
        }
    }

    let mut segments = blob.splitn(3, ',');
    let head = segments.next().unwrap_or("").trim();
    let time = segments.next().map(str::trim).unwrap_or("");
    if starts_like_score(head) && head.contains('/') && !head.contains(char::is_whitespace)
        && time.ends_with('s') && !time.contains(char::is_whitespace)
    {
        return Shape::Compact { score_depth: head, time, trailer: non_empty(segments.next()) };
    }
    Shape::Unrecognized
}

fn parse_digits<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) { return None; }
    s.parse().ok()
}

fn parse_score(s: &str) -> Option<Score> {
    if let Some(rest) = s.strip_prefix('#') {
        let (neg, n) = match rest.strip_prefix('-') { Some(n) => (true, n), None => (false, rest.strip_prefix('+').unwrap_or(rest)) };
        let n: i32 = parse_digits(n)?;
        return Some(Score::Mate(if neg { -n } else { n }));
    }
    let (neg, body) = match s.as_bytes().first()? {
        b'+' => (false, &s[1..]),
        b'-' => (true, &s[1..]),
        _ => (false, s),
    };
    if let Some(n) = body.strip_prefix('M') {
        let n: i32 = parse_digits(n)?;
        return Some(Score::Mate(if neg { -n } else { n }));
    }
    let (int, frac) = body.split_once('.').unwrap_or((body, ""));
    let pawns: i32 = parse_digits(int)?;
    let hundredths: i32 = match frac.len() {
        0 => 0,
        1 => parse_digits::<i32>(frac)? * 10,
        2 => parse_digits(frac)?,
        _ => return None,
    };
    let cp = pawns.checked_mul(100)?.checked_add(hundredths)?;
    Some(Score::Centipawns(if neg { -cp } else { cp }))
}

/// `<n>[.<frac>]s` or `<n>[.<frac>]ms`, kept exact to the nanosecond.
fn parse_elapsed(s: &str) -> Option<Duration> {
    let (body, scale) = match s.strip_suffix("ms") {
        Some(body) => (body, 6),
        None => (s.strip_suffix('s')?, 9),
    };
    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
    let whole: u64 = parse_digits(whole)?;
    if frac.len() > scale { return None; }
    let frac_nanos = if frac.is_empty() {
        0
    } else {
        parse_digits::<u64>(frac)? * 10u64.pow((scale - frac.len()) as u32)
    };
    let nanos = whole.checked_mul(10u64.pow(scale as u32))?.checked_add(frac_nanos)?;
    Some(Duration::from_nanos(nanos))
}

struct FieldReader<'a> {
    blob: &'a str,
}

impl FieldReader<'_> {
    fn read<T>(&self, field: &'static str, raw: &str, parse: impl FnOnce(&str) -> Option<T>) -> Result<T, StatisticError> {
        parse(raw).ok_or_else(|| StatisticError { field, value: raw.to_string(), blob: self.blob.to_string() })
    }
}

/// Parse one annotation blob (braces already stripped).
///
/// Blobs that fit neither dialect come back as `Dialect::Unrecognized` with the
/// whole text kept as trailer. A blob that fits a dialect but carries a field that
/// does not parse is an error.
pub fn extract(blob: Option<&str>, policy: &SuffixPolicy) -> Result<Annotation, StatisticError> {
    let Some(blob) = blob else { return Ok(Annotation::absent()) };
    let reader = FieldReader { blob };
    match classify(blob) {
        Shape::Full { fields: [score, depth, time, nodes], trailer } => {
            let (d, sd) = depth.split_once('/').unwrap_or((depth, ""));
            let stats = Statistic {
                score: reader.read("score", score, parse_score)?,
                depth: Depth {
                    depth: reader.read("depth", d, parse_digits)?,
                    seldepth: Some(reader.read("seldepth", sd, parse_digits)?),
                },
                elapsed: reader.read("time", time, |t| parse_digits(t).map(Duration::from_millis))?,
                nodes: Some(reader.read("nodes", nodes, |n| policy.node_count(n))?),
            };
            Ok(Annotation { dialect: Dialect::Full, stats: Some(stats), trailer: trailer.map(str::to_string) })
        }
        Shape::Compact { score_depth, time, trailer } => {
            let (score, depth) = score_depth.split_once('/').unwrap_or((score_depth, ""));
            let stats = Statistic {
                score: reader.read("score", score, parse_score)?,
                depth: Depth { depth: reader.read("depth", depth, parse_digits)?, seldepth: None },
                elapsed: reader.read("time", time, parse_elapsed)?,
                nodes: None,
            };
            Ok(Annotation { dialect: Dialect::Compact, stats: Some(stats), trailer: trailer.map(str::to_string) })
        }
        Shape::Unrecognized => {
            log::debug!("annotation {{{blob}}} matches no known dialect");
            Ok(Annotation {
                dialect: Dialect::Unrecognized,
                stats: None,
                trailer: non_empty(Some(blob)).map(str::to_string),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_forms() {
        assert_eq!(parse_score("+0.23"), Some(Score::Centipawns(23)));
        assert_eq!(parse_score("-0.06"), Some(Score::Centipawns(-6)));
        assert_eq!(parse_score("0.00"), Some(Score::Centipawns(0)));
        assert_eq!(parse_score("+8.42"), Some(Score::Centipawns(842)));
        assert_eq!(parse_score("-1.5"), Some(Score::Centipawns(-150)));
        assert_eq!(parse_score("+M5"), Some(Score::Mate(5)));
        assert_eq!(parse_score("-M3"), Some(Score::Mate(-3)));
        assert_eq!(parse_score("#-2"), Some(Score::Mate(-2)));
        assert_eq!(parse_score("+0.123"), None);
        assert_eq!(parse_score("+x.10"), None);
    }

    #[test]
    fn elapsed_is_exact() {
        assert_eq!(parse_elapsed("0.400s"), Some(Duration::from_millis(400)));
        assert_eq!(parse_elapsed("12s"), Some(Duration::from_secs(12)));
        assert_eq!(parse_elapsed("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_elapsed("400ms"), Some(Duration::from_millis(400)));
        assert_eq!(parse_elapsed("0.5ms"), Some(Duration::from_micros(500)));
        assert_eq!(parse_elapsed("1.5"), None);
        assert_eq!(parse_elapsed("ms"), None);
        assert_eq!(parse_elapsed("4xms"), None);
    }

    #[test]
    fn suffix_policies() {
        assert_eq!(SuffixPolicy::AnyOneNonDigit.node_count("520610"), Some(520610));
        assert_eq!(SuffixPolicy::AnyOneNonDigit.node_count("520610}"), Some(520610));
        assert_eq!(SuffixPolicy::AnyOneNonDigit.node_count("5206kk"), None);
        assert_eq!(SuffixPolicy::Strict.node_count("520610k"), None);
        assert_eq!(SuffixPolicy::OneOf(vec!['k']).node_count("520k"), Some(520));
        assert_eq!(SuffixPolicy::OneOf(vec!['k']).node_count("520n"), None);
        assert_eq!(SuffixPolicy::AnyOneNonDigit.node_count("k"), None);
    }

    #[test]
    fn policy_text_forms() {
        assert_eq!("strict".parse::<SuffixPolicy>(), Ok(SuffixPolicy::Strict));
        assert_eq!("any".parse::<SuffixPolicy>(), Ok(SuffixPolicy::AnyOneNonDigit));
        assert_eq!("oneof:kn".parse::<SuffixPolicy>(), Ok(SuffixPolicy::OneOf(vec!['k', 'n'])));
        assert!("oneof:".parse::<SuffixPolicy>().is_err());
        assert_eq!(SuffixPolicy::OneOf(vec!['k']).to_string(), "oneof:k");
    }
}
