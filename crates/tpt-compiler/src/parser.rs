//! ABP filter rule parsing
//!
//! Covers what the Disconnect-format conversion needs: host-anchored rules,
//! their options and an optional path. For the syntax see
//! https://adblockplus.org/filter-cheatsheet and
//! https://github.com/gorhill/uBlock/wiki/Static-filter-syntax

use std::collections::BTreeMap;

/// Options that make a rule irrelevant for request classification.
pub const RULES_TO_SKIP: [&str; 6] = [
    "document",
    "elemhide",
    "generichide",
    "genericblock",
    "popup",
    "csp",
];

/// Options that restrict a rule to some request types.
pub const TYPE_OPTIONS: [&str; 12] = [
    "script",
    "image",
    "stylesheet",
    "object",
    "object-subrequest",
    "subdocument",
    "xmlhttprequest",
    "websocket",
    "media",
    "font",
    "ping",
    "other",
];

// =============================================================================
// Rules
// =============================================================================

/// Value of a rule option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOption {
    /// `key=value`, value kept verbatim
    Value(String),
    /// `name` (true) or `~name` (false)
    Flag(bool),
}

/// One filter rule with its options parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbpRule {
    rule: String,
    options: BTreeMap<String, RuleOption>,
}

impl AbpRule {
    pub fn parse(rule: &str) -> Self {
        let options = match split_rule_options(rule).1 {
            Some(text) => parse_options(text),
            None => BTreeMap::new(),
        };
        Self {
            rule: rule.to_string(),
            options,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.rule
    }

    /// Rule text before the options.
    fn pattern(&self) -> &str {
        split_rule_options(&self.rule).0
    }

    /// Domain part of the rule: the text after `||` up to `^ $ / ?`.
    pub fn domain(&self) -> &str {
        let part = match self.rule.find("||") {
            Some(pos) => &self.rule[pos + 2..],
            None => &self.rule,
        };
        let end = part
            .find(|c| matches!(c, '^' | '$' | '/' | '?'))
            .unwrap_or(part.len());
        &part[..end]
    }

    /// Lowercased domain with the port dropped.
    ///
    /// A `*.` wildcard prefix is stripped when the rest is still a dotted
    /// domain; other wildcard domains give `None`.
    pub fn normalized_domain(&self) -> Option<String> {
        let domain = self.domain().to_lowercase();
        let domain = domain.split_once(':').map_or(domain.as_str(), |(host, _)| host);

        if !domain.contains('*') {
            return Some(domain.to_string());
        }
        let rest = domain.split("*.").nth(1)?;
        if rest.contains('.') {
            Some(rest.to_string())
        } else {
            None
        }
    }

    /// Heuristic check for a non-empty path after the domain.
    pub fn has_path(&self) -> bool {
        let part = self.pattern();
        let bare_trailing_slash =
            !part.contains('^') && part.matches('/').count() == 1 && part.ends_with('/');
        (part.contains('/') && !bare_trailing_slash)
            || (part.contains('^') && !part.ends_with('^'))
    }

    /// Path after the domain, without query parameters.
    pub fn path(&self) -> Option<&str> {
        if !self.has_path() {
            return None;
        }
        let part = self.pattern();
        let part = part.split_once('?').map_or(part, |(head, _)| head);

        match (part.find('^'), part.find('/')) {
            (Some(caret), Some(slash)) if caret < slash => Some(&part[caret + 1..]),
            (_, Some(slash)) => {
                let rest = &part[slash + 1..];
                Some(rest.split_once('^').map_or(rest, |(path, _)| path))
            }
            (Some(caret), None) => Some(&part[caret + 1..]),
            (None, None) => {
                log::warn!("Unexpected path format: {}", self.rule);
                None
            }
        }
    }

    /// Domains of the `domain=` option.
    pub fn domain_option(&self, drop_negations: bool) -> Option<Vec<&str>> {
        match self.options.get("domain") {
            Some(RuleOption::Value(value)) => Some(
                value
                    .split('|')
                    .filter(|d| !(drop_negations && d.starts_with('~')))
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn option(&self, name: &str) -> Option<&RuleOption> {
        self.options.get(name)
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn has_any_option(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has_option(name))
    }
}

fn split_rule_options(line: &str) -> (&str, Option<&str>) {
    match line.find('$') {
        Some(pos) => (&line[..pos], Some(&line[pos + 1..])),
        None => (line, None),
    }
}

fn parse_options(text: &str) -> BTreeMap<String, RuleOption> {
    let mut options = BTreeMap::new();

    for raw in text.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        match raw.split_once('=') {
            Some((key, value)) => {
                options.insert(key.to_string(), RuleOption::Value(value.to_string()));
            }
            None => {
                let (name, enabled) = match raw.strip_prefix('~') {
                    Some(rest) => (rest, false),
                    None => (raw, true),
                };
                options.insert(name.to_string(), RuleOption::Flag(enabled));
            }
        }
    }

    // uBO's first-party is the inverse of third-party
    if let Some(RuleOption::Flag(enabled)) = options.get("first-party").cloned() {
        options.remove("first-party");
        options.insert("third-party".to_string(), RuleOption::Flag(!enabled));
    }

    options
}

// =============================================================================
// Filter Lists
// =============================================================================

/// Host-anchored rules of a filter list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    /// `||domain...` rules
    pub blocking: Vec<AbpRule>,
    /// `@@||domain...` rules
    pub exceptions: Vec<AbpRule>,
}

/// Collect the host-anchored rules of a filter list; everything else
/// (comments, cosmetic filters, plain patterns) is ignored.
pub fn parse_filter_list(text: &str) -> FilterRules {
    let mut rules = FilterRules::default();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }

        if line.contains("##") || line.contains("#@#") || line.contains("#?#") {
            continue;
        }

        if line.starts_with("@@||") {
            rules.exceptions.push(AbpRule::parse(line));
        } else if line.starts_with("||") {
            rules.blocking.push(AbpRule::parse(line));
        }
    }

    log::debug!(
        "Parsed {} blocking and {} exception rules",
        rules.blocking.len(),
        rules.exceptions.len()
    );
    rules
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('!') || line.starts_with('[') || line.starts_with('#')
}
