use url::Url;

/// One calendar feed to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    /// Cache key and log identifier, e.g. `dublin15`
    pub id: String,
    pub url: Url,
}

impl FeedSpec {
    pub fn new(id: impl Into<String>, url: Url) -> Self {
        Self { id: id.into(), url }
    }
}
