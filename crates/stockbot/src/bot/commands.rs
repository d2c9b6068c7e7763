//! Command parsing for inbound chat text
//!
//! Parsing never fails: every input maps to exactly one [`Command`], and
//! usage problems (a missing symbol, an empty query) surface as empty
//! arguments for the dispatcher to answer.

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Welcome message
    Start,
    /// Command list
    Help,
    /// Latest quote for a symbol
    Price { symbol: String },
    /// Company name search
    Search { query: String },
    /// Trailing price summary for a symbol
    Chart { symbol: String },
    /// Portfolio placeholder
    Portfolio,
    /// Trending market symbols
    News,
    /// Any other `/`-prefixed text
    Unknown { raw: String },
    /// Nothing to answer
    Empty,
}

/// Argument-taking commands, ordered longest name first so overlapping
/// prefixes resolve to the most specific command.
const PREFIXED: [(&str, PrefixKind); 3] = [
    ("/search", PrefixKind::Search),
    ("/price", PrefixKind::Price),
    ("/chart", PrefixKind::Chart),
];

#[derive(Debug, Clone, Copy)]
enum PrefixKind {
    Price,
    Search,
    Chart,
}

impl Command {
    /// Parse the raw text of an inbound message
    pub fn parse(input: Option<&str>) -> Self {
        let Some(text) = input.filter(|t| !t.is_empty()) else {
            return Command::Empty;
        };

        match text {
            "/start" => return Command::Start,
            "/help" => return Command::Help,
            "/portfolio" => return Command::Portfolio,
            "/news" => return Command::News,
            _ => {}
        }

        for (prefix, kind) in PREFIXED {
            if text.starts_with(prefix) {
                return Self::with_args(kind, text);
            }
        }

        if text.starts_with('/') {
            Command::Unknown {
                raw: text.to_string(),
            }
        } else {
            Command::Empty
        }
    }

    fn with_args(kind: PrefixKind, text: &str) -> Self {
        let mut tokens = text.split_whitespace().skip(1);
        match kind {
            PrefixKind::Price => Command::Price {
                symbol: tokens.next().map(str::to_uppercase).unwrap_or_default(),
            },
            PrefixKind::Chart => Command::Chart {
                symbol: tokens.next().map(str::to_uppercase).unwrap_or_default(),
            },
            PrefixKind::Search => Command::Search {
                query: tokens.collect::<Vec<_>>().join(" "),
            },
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Price { .. } => "price",
            Command::Search { .. } => "search",
            Command::Chart { .. } => "chart",
            Command::Portfolio => "portfolio",
            Command::News => "news",
            Command::Unknown { .. } => "unknown",
            Command::Empty => "empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_commands() {
        assert_eq!(Command::parse(Some("/start")), Command::Start);
        assert_eq!(Command::parse(Some("/help")), Command::Help);
        assert_eq!(Command::parse(Some("/portfolio")), Command::Portfolio);
        assert_eq!(Command::parse(Some("/news")), Command::News);
    }

    #[test]
    fn test_parse_exact_commands_are_not_prefixes() {
        assert_eq!(
            Command::parse(Some("/help me")),
            Command::Unknown {
                raw: "/help me".to_string()
            }
        );
        assert_eq!(
            Command::parse(Some("/newsletter")),
            Command::Unknown {
                raw: "/newsletter".to_string()
            }
        );
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(
            Command::parse(Some("/price aapl")),
            Command::Price {
                symbol: "AAPL".to_string()
            }
        );
        assert_eq!(
            Command::parse(Some("/price   msft  extra")),
            Command::Price {
                symbol: "MSFT".to_string()
            }
        );
    }

    #[test]
    fn test_parse_price_missing_symbol() {
        assert_eq!(
            Command::parse(Some("/price")),
            Command::Price {
                symbol: String::new()
            }
        );
        assert_eq!(
            Command::parse(Some("/chart ")),
            Command::Chart {
                symbol: String::new()
            }
        );
    }

    #[test]
    fn test_parse_search_keeps_case_and_joins() {
        assert_eq!(
            Command::parse(Some("/search Apple   Inc")),
            Command::Search {
                query: "Apple Inc".to_string()
            }
        );
        assert_eq!(
            Command::parse(Some("/search")),
            Command::Search {
                query: String::new()
            }
        );
    }

    #[test]
    fn test_parse_chart() {
        assert_eq!(
            Command::parse(Some("/chart tsla")),
            Command::Chart {
                symbol: "TSLA".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unknown_and_plain_text() {
        assert_eq!(
            Command::parse(Some("/foo bar")),
            Command::Unknown {
                raw: "/foo bar".to_string()
            }
        );
        assert_eq!(Command::parse(Some("hello there")), Command::Empty);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Command::parse(None), Command::Empty);
        assert_eq!(Command::parse(Some("")), Command::Empty);
    }
}
