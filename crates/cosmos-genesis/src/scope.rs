//! Galaxy scoping for queries.
//!
//! Every row in the hosted dataset belongs to one simulated galaxy and one
//! universe time (in Myr). A [`GalaxyScope`] narrows a query to a single
//! galaxy, optionally at one universe time, either on a [`QueryBuilder`] or
//! on hand-written SQL.
//!
//! Raw SQL is rewritten structurally rather than by string replacement: the
//! statement is scanned for top-level clause keywords (outside literals,
//! comments and parentheses) and the scope predicates are spliced in there.

use crate::error::{CosmosError, CosmosResult};
use crate::query::QueryBuilder;

/// Restricts a query to one galaxy and, optionally, one universe time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalaxyScope {
    galaxy_id: String,
    universe_time: Option<u64>,
}

impl GalaxyScope {
    /// Scope to a galaxy, e.g. `"spiral-sm-2arm-001"`.
    pub fn new(galaxy_id: &str) -> CosmosResult<Self> {
        if galaxy_id.trim().is_empty() {
            return Err(CosmosError::invalid_argument("galaxy id must not be empty"));
        }
        Ok(Self {
            galaxy_id: galaxy_id.to_string(),
            universe_time: None,
        })
    }

    /// Also filter on universe time (Myr). Zero means "no time filter".
    pub fn at_universe_time(mut self, myr: u64) -> Self {
        self.universe_time = (myr > 0).then_some(myr);
        self
    }

    pub fn galaxy_id(&self) -> &str {
        &self.galaxy_id
    }

    pub fn universe_time(&self) -> Option<u64> {
        self.universe_time
    }

    /// The predicates this scope adds, in render order.
    pub fn predicates(&self) -> Vec<String> {
        let mut out = vec![format!(
            "galaxy_id = '{}'",
            self.galaxy_id.replace('\'', "''")
        )];
        if let Some(t) = self.universe_time {
            out.push(format!("universe_time = {t}"));
        }
        out
    }

    fn condition(&self) -> String {
        self.predicates().join(" AND ")
    }

    /// Return a copy of `qb` with the scope predicates ahead of its own.
    pub fn apply(&self, qb: &QueryBuilder) -> QueryBuilder {
        qb.with_leading_predicates(self.predicates())
    }

    /// Rewrite a raw SQL statement so it only sees this scope.
    ///
    /// - With a top-level `WHERE`, the existing condition is parenthesized and
    ///   AND-ed after the scope: `WHERE <scope> AND (<existing>)`.
    /// - Otherwise a `WHERE <scope>` clause is inserted before the first
    ///   top-level `GROUP BY`, `ORDER BY`, `LIMIT` or `OFFSET`, or after the
    ///   last token of the statement.
    ///
    /// Trailing comments, whitespace and semicolons stay after the inserted
    /// text, so a `--` comment can never swallow the scope.
    pub fn scope_sql(&self, sql: &str) -> CosmosResult<String> {
        let body_end = significant_end(sql, 0, sql.len());
        if body_end == 0 {
            return Err(CosmosError::invalid_argument("SQL must not be empty"));
        }

        let words = top_level_words(&sql[..body_end]);
        let condition = self.condition();

        let where_pos = words
            .iter()
            .position(|w| w.text(sql).eq_ignore_ascii_case("WHERE"));

        let out = match where_pos {
            Some(idx) => {
                let where_word = words[idx];
                let clause_end = next_clause_start(sql, &words[idx + 1..]).unwrap_or(body_end);
                let existing_end = significant_end(sql, where_word.end, clause_end);
                let existing = sql[where_word.end..existing_end].trim();
                let mut out = String::with_capacity(sql.len() + condition.len() + 16);
                out.push_str(&sql[..where_word.end]);
                out.push(' ');
                out.push_str(&condition);
                if !existing.is_empty() {
                    out.push_str(" AND (");
                    out.push_str(existing);
                    out.push(')');
                }
                out.push_str(&sql[existing_end..]);
                out
            }
            None => match next_clause_start(sql, &words) {
                Some(pos) => format!("{}WHERE {} {}", &sql[..pos], condition, &sql[pos..]),
                None => format!(
                    "{} WHERE {}{}",
                    &sql[..body_end],
                    condition,
                    &sql[body_end..]
                ),
            },
        };

        Ok(out)
    }
}

/// Byte span of a token.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn text<'a>(&self, sql: &'a str) -> &'a str {
        &sql[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Quoted,
    Comment,
    Open,
    Close,
    /// Whitespace or `;`.
    Blank,
    Symbol,
}

impl TokenKind {
    fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Blank)
    }
}

/// Splits SQL into coarse tokens. Every span starts and ends on a char boundary.
struct Tokens<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(sql: &'a str, from: usize) -> Self {
        Self {
            bytes: sql.as_bytes(),
            pos: from,
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = (TokenKind, Span);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.bytes;
        let start = self.pos;
        let &first = bytes.get(start)?;

        let (kind, end) = match first {
            b'\'' | b'"' => (TokenKind::Quoted, skip_quoted(bytes, start)),
            b'-' if bytes.get(start + 1) == Some(&b'-') => {
                let end = bytes[start..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |n| start + n);
                (TokenKind::Comment, end)
            }
            b'/' if bytes.get(start + 1) == Some(&b'*') => {
                let end = bytes[start + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(bytes.len(), |n| start + 2 + n + 2);
                (TokenKind::Comment, end)
            }
            b'(' => (TokenKind::Open, start + 1),
            b')' => (TokenKind::Close, start + 1),
            b';' => (TokenKind::Blank, start + 1),
            b if b.is_ascii_whitespace() => (TokenKind::Blank, start + 1),
            b if is_word_byte(b) => {
                let len = bytes[start..]
                    .iter()
                    .position(|&b| !is_word_byte(b))
                    .unwrap_or(bytes.len() - start);
                (TokenKind::Word, start + len)
            }
            _ => (TokenKind::Symbol, start + 1),
        };

        self.pos = end;
        Some((kind, Span { start, end }))
    }
}

/// Start of the first clause that must follow WHERE.
fn next_clause_start(sql: &str, words: &[Span]) -> Option<usize> {
    words.iter().enumerate().find_map(|(i, w)| {
        let text = w.text(sql);
        if text.eq_ignore_ascii_case("LIMIT") || text.eq_ignore_ascii_case("OFFSET") {
            return Some(w.start);
        }
        let pair = text.eq_ignore_ascii_case("GROUP") || text.eq_ignore_ascii_case("ORDER");
        match words.get(i + 1) {
            Some(next) if pair && next.text(sql).eq_ignore_ascii_case("BY") => Some(w.start),
            _ => None,
        }
    })
}

/// End of the last token in `sql[from..to]` that is not a comment, whitespace
/// or `;`. Returns `from` when there is none.
fn significant_end(sql: &str, from: usize, to: usize) -> usize {
    Tokens::new(&sql[..to], from)
        .filter(|(kind, _)| !kind.is_trivia())
        .last()
        .map_or(from, |(_, span)| span.end)
}

/// Word tokens at parenthesis depth 0, skipping literals and comments.
fn top_level_words(sql: &str) -> Vec<Span> {
    let mut words = Vec::new();
    let mut depth: i32 = 0;

    for (kind, span) in Tokens::new(sql, 0) {
        match kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close => depth -= 1,
            TokenKind::Word if depth == 0 => words.push(span),
            _ => {}
        }
    }

    words
}

/// Skip a quoted literal or identifier starting at `open`; doubled quotes escape.
fn skip_quoted(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Identifier bytes. Non-ASCII bytes count too so multi-byte chars stay whole.
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::select_from;

    fn scope() -> GalaxyScope {
        GalaxyScope::new("spiral-sm-2arm-001").unwrap()
    }

    #[test]
    fn test_empty_galaxy_rejected() {
        assert!(GalaxyScope::new(" ").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_predicates_with_time() {
        let s = scope().at_universe_time(4600);
        assert_eq!(
            s.predicates(),
            vec![
                "galaxy_id = 'spiral-sm-2arm-001'".to_string(),
                "universe_time = 4600".to_string(),
            ]
        );
    }

    #[test]
    fn test_zero_time_means_unset() {
        let s = scope().at_universe_time(0);
        assert_eq!(s.universe_time(), None);
        assert_eq!(s.predicates().len(), 1);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let s = GalaxyScope::new("o'brien").unwrap();
        assert_eq!(s.predicates()[0], "galaxy_id = 'o''brien'");
    }

    #[test]
    fn test_apply_to_builder() {
        let qb = select_from("star")
            .unwrap()
            .r#where("stellar_mass_msun > 10")
            .unwrap()
            .limit(100)
            .unwrap();
        let scoped = scope().at_universe_time(100).apply(&qb);
        assert_eq!(
            scoped.build().unwrap(),
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND universe_time = 100 AND stellar_mass_msun > 10 LIMIT 100"
        );
        // Source builder is unchanged.
        assert_eq!(qb.predicates().len(), 1);
    }

    #[test]
    fn test_scope_sql_with_where() {
        let sql = scope()
            .scope_sql("SELECT * FROM star WHERE stellar_mass_msun > 10 LIMIT 100")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND (stellar_mass_msun > 10) LIMIT 100"
        );
    }

    #[test]
    fn test_scope_sql_wraps_or_condition() {
        let sql = scope()
            .scope_sql("select * from star where a = 1 or b = 2")
            .unwrap();
        assert_eq!(
            sql,
            "select * from star where galaxy_id = 'spiral-sm-2arm-001' AND (a = 1 or b = 2)"
        );
    }

    #[test]
    fn test_scope_sql_without_where_before_limit() {
        let sql = scope().scope_sql("SELECT * FROM planet LIMIT 5").unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM planet WHERE galaxy_id = 'spiral-sm-2arm-001' LIMIT 5"
        );
    }

    #[test]
    fn test_scope_sql_uses_earliest_clause() {
        let sql = scope()
            .scope_sql("SELECT * FROM planet ORDER BY mass_earth DESC LIMIT 5")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM planet WHERE galaxy_id = 'spiral-sm-2arm-001' ORDER BY mass_earth DESC LIMIT 5"
        );
    }

    #[test]
    fn test_scope_sql_before_group_by() {
        let sql = scope()
            .scope_sql("SELECT spectral_type, COUNT(*) FROM star GROUP BY spectral_type")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT spectral_type, COUNT(*) FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' GROUP BY spectral_type"
        );
    }

    #[test]
    fn test_scope_sql_appends_and_keeps_semicolon() {
        let sql = scope()
            .at_universe_time(250)
            .scope_sql("SELECT * FROM star;\n")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND universe_time = 250;\n"
        );
    }

    #[test]
    fn test_scope_sql_ignores_literals_and_subqueries() {
        let raw = "SELECT * FROM star s JOIN (SELECT system_id FROM planet WHERE habitable) p ON s.system_id = p.system_id AND s.note = 'limit where'";
        let sql = scope().scope_sql(raw).unwrap();
        assert!(sql.starts_with(raw));
        assert!(sql.ends_with(" WHERE galaxy_id = 'spiral-sm-2arm-001'"));
    }

    #[test]
    fn test_scope_sql_where_then_order_by() {
        let sql = scope()
            .scope_sql("SELECT * FROM star WHERE spectral_type = 'O' ORDER BY stellar_mass_msun")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND (spectral_type = 'O') ORDER BY stellar_mass_msun"
        );
    }

    #[test]
    fn test_scope_sql_rejects_empty() {
        assert!(scope().scope_sql(" ; ").unwrap_err().is_invalid_argument());
        assert!(
            scope()
                .scope_sql("-- nothing here\n")
                .unwrap_err()
                .is_invalid_argument()
        );
    }

    #[test]
    fn test_scope_sql_before_trailing_line_comment() {
        let sql = scope().scope_sql("SELECT * FROM star -- bright stars").unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' -- bright stars"
        );
    }

    #[test]
    fn test_scope_sql_where_with_line_comment_before_limit() {
        let sql = scope()
            .scope_sql("SELECT * FROM star WHERE a = 1 -- note\nLIMIT 5")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND (a = 1) -- note\nLIMIT 5"
        );
    }

    #[test]
    fn test_scope_sql_where_with_trailing_comment_and_semicolon() {
        let sql = scope()
            .scope_sql("SELECT * FROM star WHERE a = 1 /* hot */; -- done")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND (a = 1) /* hot */; -- done"
        );
    }

    #[test]
    fn test_scope_sql_keeps_comment_inside_condition() {
        let sql = scope()
            .scope_sql("SELECT * FROM star WHERE a = 1 -- hot\n OR b = 2")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND (a = 1 -- hot\n OR b = 2)"
        );
    }

    #[test]
    fn test_scope_sql_handles_non_ascii() {
        let sql = scope()
            .scope_sql("SELECT * FROM star WHERE name = 'Ω' -- très chaud")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND (name = 'Ω') -- très chaud"
        );
    }
}
