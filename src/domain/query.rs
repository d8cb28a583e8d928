//! Query language decoding into query trees
//!
//! A query is a sequence of node terms separated by relation terms, e.g.
//! `upos=NOUN >amod _`. Node terms are `|`-separated alternatives of
//! `&`-joined restrictions; relation terms start with `<` or `>` and carry
//! `|`-separated dependency labels. Parenthesized terms are nested queries.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::QueryNode;
use crate::domain::tokenizer::{split_query_text_with, ParenPolicy};

/// Universal Dependencies morphological features accepted as restriction keys.
pub const UNIVERSAL_FEATURES: &[&str] = &[
    "PronType", "NumType", "Poss", "Reflex", "Foreign", "Abbr", "Typo", "Gender", "Animacy",
    "NounClass", "Number", "Case", "Definite", "Degree", "VerbForm", "Mood", "Tense", "Aspect",
    "Voice", "Evident", "Polarity", "Person", "Polite", "Clusivity",
];

/// Required (or, when negated, excluded) value of one token attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint {
    pub negated: bool,
    pub value: String,
}

impl Constraint {
    pub fn new(negated: bool, value: impl Into<String>) -> Self {
        Self {
            negated,
            value: value.into(),
        }
    }
}

/// One alternative a token must satisfy; all present constraints apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Restriction {
    pub form: Option<Constraint>,
    pub lemma: Option<Constraint>,
    pub upos: Option<Constraint>,
    pub xpos: Option<Constraint>,
    pub feats: Option<Constraint>,
    pub features: BTreeMap<String, Constraint>,
    pub deprel: Option<Constraint>,
}

impl Restriction {
    pub fn deprel(constraint: Constraint) -> Self {
        Self {
            deprel: Some(constraint),
            ..Self::default()
        }
    }

    pub fn form(constraint: Constraint) -> Self {
        Self {
            form: Some(constraint),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "_");
        }
        let named = [
            ("form", &self.form),
            ("L", &self.lemma),
            ("upos", &self.upos),
            ("xpos", &self.xpos),
            ("feats", &self.feats),
        ];
        let parts = named
            .into_iter()
            .filter_map(|(key, constraint)| constraint.as_ref().map(|c| (key, c)))
            .chain(self.features.iter().map(|(key, c)| (key.as_str(), c)))
            .chain(self.deprel.as_ref().map(|c| ("deprel", c)))
            .map(|(key, c)| format!("{}{}={}", if c.negated { "!" } else { "" }, key, c.value));
        write!(f, "{}", parts.format("&"))
    }
}
/// Default bound on parenthesis nesting accepted by [`QueryDecoder`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Decodes query text into a [`QueryNode`] tree.
#[derive(Debug, Clone)]
pub struct QueryDecoder {
    features: HashSet<String>,
    policy: ParenPolicy,
    max_depth: usize,
}

impl Default for QueryDecoder {
    fn default() -> Self {
        Self::new(UNIVERSAL_FEATURES.iter().copied(), ParenPolicy::default())
    }
}

impl QueryDecoder {
    pub fn new<S: Into<String>>(features: impl IntoIterator<Item = S>, policy: ParenPolicy) -> Self {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            policy,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Rejects queries nesting groups deeper than `max_depth`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decodes a whole query; the first node before a `>` relation is the root.
    #[instrument(level = "debug", skip(self))]
    pub fn decode(&self, query: &str) -> DomainResult<QueryNode> {
        let tree = self.decode_term(query, None, 0)?;
        debug!(size = tree.size(), "decoded query");
        Ok(tree)
    }

    /// `depth` counts the groups entered so far. Recursion only happens
    /// through nested groups, so it is bounded by `max_depth`.
    fn decode_term(&self, term: &str, relation: Option<&str>, depth: usize) -> DomainResult<QueryNode> {
        if term.is_empty() {
            return Err(DomainError::invalid_query(term, "empty node term"));
        }
        let (inner, depth) = self.peel_groups(term, depth)?;
        let deprels = match relation {
            Some(relation) => parse_relation(relation),
            None => Vec::new(),
        };

        if inner == "_" {
            let restrictions = deprels.into_iter().map(Restriction::deprel).collect();
            return Ok(QueryNode::with_restrictions(restrictions));
        }

        let terms = split_query_text_with(inner, self.policy)?;
        match terms.as_slice() {
            [single] => {
                let restrictions = self.decode_restrictions(single)?;
                Ok(QueryNode::with_restrictions(merge_deprels(restrictions, &deprels)))
            }
            _ => self.decode_sequence(inner, &terms, relation, depth),
        }
    }

    /// Removes every pair of parentheses wrapping the whole term.
    fn peel_groups<'t>(&self, term: &'t str, mut depth: usize) -> DomainResult<(&'t str, usize)> {
        let mut inner = term;
        while let Some(stripped) = strip_group(inner) {
            depth += 1;
            if depth > self.max_depth {
                return Err(DomainError::invalid_query(
                    term,
                    format!("groups nested deeper than {}", self.max_depth),
                ));
            }
            inner = stripped;
        }
        Ok((inner, depth))
    }

    fn decode_sequence(
        &self,
        query: &str,
        terms: &[&str],
        relation: Option<&str>,
        depth: usize,
    ) -> DomainResult<QueryNode> {
        if terms.len() % 2 == 0 {
            return Err(DomainError::invalid_query(query, "relation without a target node"));
        }
        let nodes: Vec<&str> = terms.iter().copied().step_by(2).collect();
        let relations: Vec<&str> = terms.iter().copied().skip(1).step_by(2).collect();
        if let Some(bad) = relations
            .iter()
            .find(|r| !(r.starts_with('<') || r.starts_with('>')))
        {
            return Err(DomainError::invalid_query(
                query,
                format!("relation '{bad}' must start with '<' or '>'"),
            ));
        }

        let root_index = relations
            .iter()
            .position(|r| r.starts_with('>'))
            .unwrap_or(relations.len());

        let mut root = None;
        let mut children = Vec::with_capacity(nodes.len().saturating_sub(1));
        for (index, node) in nodes.iter().enumerate() {
            if index < root_index {
                children.push(self.decode_term(node, Some(relations[index]), depth)?);
            } else if index > root_index {
                children.push(self.decode_term(node, Some(relations[index - 1]), depth)?);
            } else {
                root = Some(self.decode_term(node, relation, depth)?);
            }
        }

        let root = root.ok_or_else(|| DomainError::invalid_query(query, "no root node"))?;
        Ok(root.with_children(children))
    }

    fn decode_restrictions(&self, term: &str) -> DomainResult<Vec<Restriction>> {
        term.split('|')
            .map(|alternative| {
                let mut restriction = Restriction::default();
                for part in alternative.split('&') {
                    self.apply_part(term, part, &mut restriction)?;
                }
                Ok(restriction)
            })
            .collect()
    }

    fn apply_part(&self, term: &str, part: &str, restriction: &mut Restriction) -> DomainResult<()> {
        let (negated, body) = match part.strip_prefix('!') {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, part),
        };
        if body.is_empty() {
            return Err(DomainError::invalid_query(term, "empty restriction"));
        }

        let Some((key, value)) = body.split_once('=') else {
            restriction.form = Some(Constraint::new(negated, body));
            return Ok(());
        };
        if value.is_empty() {
            return Err(DomainError::invalid_query(term, format!("missing value for '{key}'")));
        }

        let constraint = Constraint::new(negated, value);
        match key {
            "form" => restriction.form = Some(constraint),
            "L" => restriction.lemma = Some(constraint),
            "upos" => restriction.upos = Some(constraint),
            "xpos" => restriction.xpos = Some(constraint),
            "feats" => restriction.feats = Some(constraint),
            feature if self.features.contains(feature) => {
                restriction.features.insert(feature.to_string(), constraint);
            }
            other => {
                return Err(DomainError::invalid_query(
                    term,
                    format!("unsupported restriction key '{other}'"),
                ))
            }
        }
        Ok(())
    }
}

/// Decodes `query` with the universal feature set and the default paren policy.
pub fn decode_query(query: &str) -> DomainResult<QueryNode> {
    QueryDecoder::default().decode(query)
}

/// Contents of a term wrapped in one matching pair of parentheses.
///
/// `(a) (b)` is not a group: its first `(` closes before the end.
fn strip_group(term: &str) -> Option<&str> {
    let inner = term.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i64;
    for byte in inner.bytes() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(inner)
}

/// `<amod|<!nsubj` -> [amod, !nsubj]. Empty labels are dropped.
fn parse_relation(relation: &str) -> Vec<Constraint> {
    let mut labels = Vec::new();
    for label in relation.split('|') {
        let label = label
            .strip_prefix('<')
            .or_else(|| label.strip_prefix('>'))
            .unwrap_or(label);
        let (negated, label) = match label.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, label),
        };
        if !label.is_empty() {
            labels.push(Constraint::new(negated, label));
        }
    }
    labels
}

/// Every restriction combined with every dependency label, labels outermost.
fn merge_deprels(restrictions: Vec<Restriction>, deprels: &[Constraint]) -> Vec<Restriction> {
    if deprels.is_empty() {
        return restrictions;
    }
    deprels
        .iter()
        .cartesian_product(restrictions.iter())
        .map(|(deprel, restriction)| Restriction {
            deprel: Some(deprel.clone()),
            ..restriction.clone()
        })
        .collect()
}
