//! Minimal flag scanner shared by the argument proxies.
//!
//! The proxies only recognise a handful of options and must forward
//! everything else untouched, so a full parser is the wrong tool: unknown
//! flags are not errors and their relative order has to survive. The scanner
//! walks the explicit argument list once and classifies each token.

use super::ProxyError;

/// Whether a recognised flag requires, or merely accepts, a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Arity {
    Required,
    Optional,
}

/// Description of a flag recognised by a proxy, identified by `K`.
#[derive(Debug, Clone, Copy)]
pub(super) struct FlagSpec<K> {
    pub(super) key: K,
    pub(super) short: Option<char>,
    pub(super) long: Option<&'static str>,
    pub(super) arity: Arity,
}

impl<K: Copy> FlagSpec<K> {
    pub(super) const fn new(
        key: K,
        short: Option<char>,
        long: Option<&'static str>,
    ) -> Self {
        Self {
            key,
            short,
            long,
            arity: Arity::Required,
        }
    }

    pub(super) const fn optional_value(mut self) -> Self {
        self.arity = Arity::Optional;
        self
    }
}

/// Classification of a single scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Token<K> {
    /// A recognised flag with its value, if one was supplied.
    Flag { key: K, value: Option<String> },
    /// A bare token.
    Positional(String),
    /// An unrecognised flag, forwarded verbatim.
    Passthrough(String),
}

/// Scans `arguments` against `specs`.
pub(super) fn scan<K: Copy>(
    arguments: &[String],
    specs: &[FlagSpec<K>],
) -> Result<Vec<Token<K>>, ProxyError> {
    let mut tokens = Vec::with_capacity(arguments.len());
    let mut remaining = arguments.iter().peekable();

    while let Some(argument) = remaining.next() {
        if argument == "--" {
            tokens.extend(remaining.by_ref().cloned().map(Token::Positional));
            break;
        }

        let Some((spec, inline)) = match_flag(argument, specs) else {
            tokens.push(classify_unmatched(argument));
            continue;
        };

        let value = match (inline, spec.arity) {
            (Some(value), _) => Some(value),
            (None, Arity::Required) => match remaining.next() {
                Some(value) => Some(value.clone()),
                None => {
                    return Err(ProxyError::MissingValue {
                        flag: argument.clone(),
                    });
                }
            },
            (None, Arity::Optional) => remaining.next_if(|next| is_value(next)).cloned(),
        };
        tokens.push(Token::Flag {
            key: spec.key,
            value,
        });
    }

    Ok(tokens)
}

/// Whether a token following an optional-value flag is its value rather
/// than another flag: bare words, words with spaces (`"-p 5433"`), a lone
/// dash and negative numbers qualify.
fn is_value(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('-') else {
        return true;
    };
    rest.is_empty()
        || token.contains(char::is_whitespace)
        || (rest.starts_with(|c: char| c.is_ascii_digit()) && rest.parse::<f64>().is_ok())
}

fn classify_unmatched<K>(argument: &str) -> Token<K> {
    if argument.len() > 1 && argument.starts_with('-') {
        Token::Passthrough(argument.to_owned())
    } else {
        Token::Positional(argument.to_owned())
    }
}

/// Finds the spec matching `argument` and any value attached to it.
fn match_flag<'a, K>(
    argument: &str,
    specs: &'a [FlagSpec<K>],
) -> Option<(&'a FlagSpec<K>, Option<String>)> {
    if let Some(body) = argument.strip_prefix("--") {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value.to_owned())),
            None => (body, None),
        };
        return specs
            .iter()
            .find(|spec| spec.long == Some(name))
            .map(|spec| (spec, inline));
    }

    let body = argument.strip_prefix('-')?;
    let mut characters = body.chars();
    let short = characters.next()?;
    let spec = specs.iter().find(|spec| spec.short == Some(short))?;
    let attached = characters.as_str();
    let inline = (!attached.is_empty()).then(|| attached.to_owned());
    Some((spec, inline))
}
