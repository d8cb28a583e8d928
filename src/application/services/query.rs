//! Query text service: tokenizing and decoding with configured settings

use std::sync::Arc;

use tracing::instrument;

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{split_query_bytes, split_query_text_with, QueryDecoder, QueryNode};

pub struct QueryService {
    settings: Arc<Settings>,
    decoder: QueryDecoder,
}

impl QueryService {
    pub fn new(settings: Arc<Settings>) -> Self {
        let decoder = QueryDecoder::new(
            settings.query.features.iter().cloned(),
            settings.tokenizer.unbalanced,
        )
        .with_max_depth(settings.query.max_depth);
        Self { settings, decoder }
    }

    /// Splits query text on spaces outside parentheses.
    pub fn tokenize<'a>(&self, text: &'a str) -> ApplicationResult<Vec<&'a str>> {
        Ok(split_query_text_with(text, self.settings.tokenizer.unbalanced)?)
    }

    /// Like [`tokenize`](Self::tokenize) for raw input; rejects malformed UTF-8.
    pub fn tokenize_bytes<'a>(&self, bytes: &'a [u8]) -> ApplicationResult<Vec<&'a str>> {
        Ok(split_query_bytes(bytes, self.settings.tokenizer.unbalanced)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn decode(&self, query: &str) -> ApplicationResult<QueryNode> {
        Ok(self.decoder.decode(query)?)
    }

    /// Decodes every query, failing on the first invalid one.
    pub fn decode_all<S: AsRef<str>>(&self, queries: &[S]) -> ApplicationResult<Vec<QueryNode>> {
        queries.iter().map(|q| self.decode(q.as_ref())).collect()
    }
}
