//! PGN import.
//!
//! Import goes in three passes: the text is split into tokens, the token
//! stream is checked for shape (tag count, balanced parentheses, a final
//! result), and the moves are replayed on a fresh [`Game`].

use crate::san::is_san_shaped;
use crate::tags::{TagSet, REQUIRED_TAGS};
use crate::{ChessError, Game, Position, Variation};

/// Result tokens accepted at the end of movetext.
const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// A lexical unit of a PGN document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `[Key "Value"]`, value unescaped.
    Tag { key: String, value: String },
    /// `12.` or `12...`
    MoveNumber(u32),
    /// A SAN move with any `!`/`?` annotation removed.
    San(String),
    Result(String),
    Open,
    Close,
    /// Numeric annotation glyph, `$n`.
    Nag(u32),
}

/// Splits a PGN document into tokens. Comments are dropped.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ChessError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '{' => {
                let end = find(&chars, i + 1, '}')
                    .ok_or_else(|| invalid("unterminated '{' comment"))?;
                i = end + 1;
            }
            ';' => i = find(&chars, i + 1, '\n').unwrap_or(chars.len()),
            '%' if i == 0 || chars[i - 1] == '\n' => {
                i = find(&chars, i + 1, '\n').unwrap_or(chars.len())
            }
            '[' => {
                let (token, next) = read_tag(&chars, i + 1)?;
                tokens.push(token);
                i = next;
            }
            '(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            ')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            ']' | '}' => return Err(invalid(&format!("unexpected '{}'", c))),
            _ => {
                let start = i;
                while i < chars.len() && !is_delimiter(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                classify(&word, &mut tokens)?;
            }
        }
    }
    Ok(tokens)
}

fn invalid(reason: &str) -> ChessError {
    ChessError::InvalidPgn(reason.to_string())
}

fn find(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars[from.min(chars.len())..]
        .iter()
        .position(|&c| c == target)
        .map(|offset| from + offset)
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ';')
}

/// Reads `Key "Value"]` starting just after the `[`.
fn read_tag(chars: &[char], mut i: usize) -> Result<(Token, usize), ChessError> {
    let skip_space = |mut i: usize| {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        i
    };

    i = skip_space(i);
    let start = i;
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    if i == start {
        return Err(invalid("tag pair without a key"));
    }
    let key: String = chars[start..i].iter().collect();

    i = skip_space(i);
    if chars.get(i) != Some(&'"') {
        return Err(invalid(&format!("tag {} has no quoted value", key)));
    }
    i += 1;

    let mut value = String::new();
    loop {
        match chars.get(i) {
            None => return Err(invalid(&format!("unterminated value for tag {}", key))),
            Some('"') => break,
            Some('\\') => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or_else(|| invalid(&format!("unterminated value for tag {}", key)))?;
                value.push(*escaped);
                i += 2;
            }
            Some(&c) => {
                value.push(c);
                i += 1;
            }
        }
    }
    i = skip_space(i + 1);
    if chars.get(i) != Some(&']') {
        return Err(invalid(&format!("tag {} is missing ']'", key)));
    }
    Ok((Token::Tag { key, value }, i + 1))
}

/// Turns a movetext word into tokens. `1.e4` yields a move number and a move.
fn classify(word: &str, tokens: &mut Vec<Token>) -> Result<(), ChessError> {
    if RESULTS.contains(&word) {
        tokens.push(Token::Result(word.to_string()));
        return Ok(());
    }
    if let Some(digits) = word.strip_prefix('$') {
        let nag = digits
            .parse()
            .map_err(|_| invalid(&format!("bad annotation glyph '{}'", word)))?;
        tokens.push(Token::Nag(nag));
        return Ok(());
    }

    let digits_end = word.find(|c: char| !c.is_ascii_digit()).unwrap_or(word.len());
    let mut rest = word;
    if digits_end > 0 && word[digits_end..].starts_with('.') {
        let number = word[..digits_end]
            .parse()
            .map_err(|_| invalid(&format!("bad move number '{}'", word)))?;
        tokens.push(Token::MoveNumber(number));
        rest = word[digits_end..].trim_start_matches('.');
        if rest.is_empty() {
            return Ok(());
        }
    }

    let san = rest.trim_end_matches(['!', '?']);
    if is_san_shaped(san) {
        tokens.push(Token::San(san.to_string()));
        Ok(())
    } else {
        Err(invalid(&format!("unexpected token '{}'", word)))
    }
}

/// Checks the shape of one game's tokens without replaying moves.
fn check_tokens(tokens: &[Token]) -> Result<(), ChessError> {
    let tag_count = tokens
        .iter()
        .take_while(|t| matches!(t, Token::Tag { .. }))
        .count();
    if tag_count < REQUIRED_TAGS.len() {
        return Err(invalid(&format!(
            "expected at least {} tag pairs, found {}",
            REQUIRED_TAGS.len(),
            tag_count
        )));
    }

    // moves seen on each open line; the main line is at the bottom
    let mut lines = vec![0usize];
    let mut finished = false;
    for token in &tokens[tag_count..] {
        if finished {
            return Err(invalid("movetext continues after the result"));
        }
        match token {
            Token::Tag { key, .. } => {
                return Err(invalid(&format!("tag {} inside movetext", key)))
            }
            Token::San(_) => {
                if let Some(count) = lines.last_mut() {
                    *count += 1;
                }
            }
            Token::Open => {
                if lines.last() == Some(&0) {
                    return Err(invalid("variation before any move"));
                }
                lines.push(0);
            }
            Token::Close => {
                if lines.len() == 1 {
                    return Err(invalid("unbalanced ')'"));
                }
                if lines.pop() == Some(0) {
                    return Err(invalid("empty variation"));
                }
            }
            Token::Result(_) => {
                if lines.len() > 1 {
                    return Err(invalid("result inside a variation"));
                }
                finished = true;
            }
            Token::MoveNumber(_) | Token::Nag(_) => {}
        }
    }

    if lines.len() > 1 {
        return Err(invalid("unclosed '('"));
    }
    if lines[0] == 0 {
        return Err(invalid("no moves in the main line"));
    }
    if !finished {
        return Err(invalid("missing result"));
    }
    Ok(())
}

/// A variation being read; it is created by its first move.
struct OpenLine {
    anchor_ply: usize,
    anchor: Position,
    variation: Option<Variation>,
}

impl OpenLine {
    fn push_san(&mut self, san: &str) -> Result<(), ChessError> {
        match &mut self.variation {
            Some(variation) => variation.append_san(san).map(|_| ()),
            None => {
                self.variation = Some(Variation::from_position(
                    self.anchor_ply,
                    self.anchor.clone(),
                    san,
                )?);
                Ok(())
            }
        }
    }

    /// Ply and position of this line's last move, where a nested variation
    /// branches off.
    fn branch_point(&self) -> Result<(usize, Position), ChessError> {
        let variation = self
            .variation
            .as_ref()
            .ok_or_else(|| invalid("variation before any move"))?;
        let last = variation.moves().len() - 1;
        Ok((variation.anchor_ply() + last, variation.positions()[last].clone()))
    }
}

fn build_game(tokens: &[Token]) -> Result<Game, ChessError> {
    let mut tags = TagSet::new();
    for token in tokens {
        if let Token::Tag { key, value } = token {
            tags.insert(key, value.as_str());
        }
    }

    let mut game = match tags.get("FEN") {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };

    let mut open: Vec<OpenLine> = Vec::new();
    for token in tokens {
        match token {
            Token::San(san) => match open.last_mut() {
                Some(line) => line.push_san(san)?,
                None => {
                    game.apply_san(san)?;
                }
            },
            Token::Open => {
                let (anchor_ply, anchor) = match open.last() {
                    Some(line) => line.branch_point()?,
                    None => {
                        let ply = game
                            .last_ply()
                            .checked_sub(1)
                            .ok_or_else(|| invalid("variation before any move"))?;
                        (ply, game.positions()[ply].clone())
                    }
                };
                open.push(OpenLine {
                    anchor_ply,
                    anchor,
                    variation: None,
                });
            }
            Token::Close => {
                let line = open.pop().ok_or_else(|| invalid("unbalanced ')'"))?;
                let variation = line.variation.ok_or_else(|| invalid("empty variation"))?;
                match open.last_mut().and_then(|parent| parent.variation.as_mut()) {
                    Some(parent) => parent.push_child(variation)?,
                    None => game.add_variation(variation)?,
                }
            }
            Token::Tag { .. } | Token::MoveNumber(_) | Token::Result(_) | Token::Nag(_) => {}
        }
    }

    game.replace_tags(tags);
    Ok(game)
}

/// Reads PGN documents into [`Game`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgnImporter;

impl PgnImporter {
    /// Checks the document's shape, naming the first problem found.
    ///
    /// Moves are not replayed, so a well-formed document may still fail to
    /// import.
    pub fn check(text: &str) -> Result<(), ChessError> {
        check_tokens(&tokenize(text)?)
    }

    /// Whether the document is well formed.
    pub fn validate(text: &str) -> bool {
        Self::check(text).is_ok()
    }

    /// Imports a single game.
    ///
    /// Tags from the document override derived ones, including `Result`.
    /// A `FEN` tag sets the starting position.
    pub fn import(text: &str) -> Result<Game, ChessError> {
        let tokens = tokenize(text)?;
        check_tokens(&tokens)?;
        build_game(&tokens)
    }

    /// Imports every game of a multi-game document.
    pub fn import_all(text: &str) -> Result<Vec<Game>, ChessError> {
        let tokens = tokenize(text)?;
        let mut games = Vec::new();
        let mut start = 0;
        for (i, token) in tokens.iter().enumerate() {
            if let Token::Result(_) = token {
                let game = &tokens[start..=i];
                check_tokens(game)?;
                games.push(build_game(game)?);
                start = i + 1;
            }
        }
        if start < tokens.len() {
            check_tokens(&tokens[start..])?;
        }
        Ok(games)
    }
}
