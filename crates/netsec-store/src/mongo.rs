use crate::error::{StoreError, StoreResult};
use crate::{DocumentSource, Record};
use mongodb::bson::{doc, Bson, Document};
use mongodb::sync::{Client, Collection};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct MongoSourceOptions {
    pub connect_timeout_ms: u64,
    pub server_selection_timeout_ms: u64,
}

impl Default for MongoSourceOptions {
    fn default() -> Self {
        Self { connect_timeout_ms: 5_000, server_selection_timeout_ms: 10_000 }
    }
}

/// Reads whole collections from MongoDB.
///
/// The client is created per `fetch_all` call and dropped when it returns, so
/// no connection outlives a fetch.
#[derive(Debug, Clone)]
pub struct MongoSource {
    uri: String,
    options: MongoSourceOptions,
}

impl MongoSource {
    #[must_use]
    pub fn new(uri: impl Into<String>, options: MongoSourceOptions) -> Self {
        Self { uri: uri.into(), options }
    }

    fn connection_uri(&self) -> String {
        with_timeouts(&self.uri, &self.options)
    }
}

/// Appends timeout parameters unless the connection string already sets them.
fn with_timeouts(uri: &str, options: &MongoSourceOptions) -> String {
    let mut out = uri.to_string();
    // option names are case-insensitive
    let lowered = uri.to_ascii_lowercase();
    let mut params = Vec::new();
    if !lowered.contains("connecttimeoutms=") {
        params.push(format!("connectTimeoutMS={}", options.connect_timeout_ms));
    }
    if !lowered.contains("serverselectiontimeoutms=") {
        params.push(format!("serverSelectionTimeoutMS={}", options.server_selection_timeout_ms));
    }
    if params.is_empty() {
        return out;
    }

    if out.contains('?') {
        if !out.ends_with('?') && !out.ends_with('&') {
            out.push('&');
        }
    } else {
        // mongodb://host is valid without a trailing slash; options need one
        let after_scheme = out.split_once("://").map_or(out.as_str(), |(_, rest)| rest);
        if !after_scheme.contains('/') {
            out.push('/');
        }
        out.push('?');
    }
    out.push_str(&params.join("&"));
    out
}

fn document_to_record(document: Document) -> StoreResult<Record> {
    match Bson::Document(document).into_relaxed_extjson() {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidRecord(other.to_string())),
    }
}

impl DocumentSource for MongoSource {
    fn id(&self) -> &'static str {
        "mongodb"
    }

    fn fetch_all(&self, database: &str, collection: &str) -> StoreResult<Vec<Record>> {
        info!(database, collection, "fetching collection from mongodb");
        let client = Client::with_uri_str(self.connection_uri())?;
        let coll: Collection<Document> = client.database(database).collection(collection);

        let cursor = coll.find(doc! {}).run()?;
        let mut records = Vec::new();
        for document in cursor {
            records.push(document_to_record(document?)?);
        }

        debug!(count = records.len(), "fetched documents");
        Ok(records)
    }
}
