//! Pinecone vector store over the REST API

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

use ragchat_core::{
    Error, Metadata, Result, ScoredDocument, SessionConfig, SourceDocument, VectorDocument,
    VectorStore,
};

/// Metadata key under which chunk text is stored
pub const TEXT_KEY: &str = "text";

/// Vectors per upsert request
const UPSERT_BATCH_SIZE: usize = 100;

/// Connection settings for a Pinecone index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PineconeConfig {
    pub api_key: String,
    pub environment: String,
    pub index: String,
    pub namespace: String,
}

impl PineconeConfig {
    pub fn from_session(config: &SessionConfig) -> Self {
        Self {
            api_key: config.pinecone_api_key.clone(),
            environment: config.pinecone_environment.clone(),
            index: config.pinecone_index.clone(),
            namespace: config.namespace.clone(),
        }
    }

    /// Controller endpoint for the configured environment
    pub fn controller_url(&self) -> String {
        format!("https://controller.{}.pinecone.io", self.environment)
    }

    /// Data plane host of the index for a given project
    pub fn index_host(&self, project: &str) -> String {
        format!(
            "https://{}-{}.svc.{}.pinecone.io",
            self.index, project, self.environment
        )
    }
}

#[derive(Deserialize)]
struct WhoAmI {
    project_name: String,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: Metadata,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: usize,
}

/// Vector store backed by a remote Pinecone index
pub struct PineconeVectorStore {
    client: Client,
    config: PineconeConfig,
    host: Url,
}

impl PineconeVectorStore {
    /// Resolve the index host through the environment's controller and connect
    pub async fn connect(config: PineconeConfig) -> Result<Self> {
        let controller = config.controller_url();
        Self::connect_via(config, &controller).await
    }

    /// Resolve the index host through an explicit controller endpoint
    pub async fn connect_via(config: PineconeConfig, controller_url: &str) -> Result<Self> {
        let client = build_client()?;
        let url = format!("{}/actions/whoami", controller_url.trim_end_matches('/'));

        let response = client
            .get(&url)
            .header("Api-Key", &config.api_key)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let whoami: WhoAmI = read_json(response).await?;

        let host = config.index_host(&whoami.project_name);
        info!(%host, "Resolved Pinecone index host");
        Self::with_host(config, &host)
    }

    /// Connect to a known data plane host without resolving it
    pub fn with_host(config: PineconeConfig, host: &str) -> Result<Self> {
        let mut host = host.to_string();
        if !host.ends_with('/') {
            host.push('/');
        }
        let host = Url::parse(&host)
            .map_err(|e| Error::Configuration(format!("Invalid Pinecone host {}: {}", host, e)))?;

        Ok(Self {
            client: build_client()?,
            config,
            host,
        })
    }

    pub fn config(&self) -> &PineconeConfig {
        &self.config
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self
            .host
            .join(path)
            .map_err(|e| Error::Configuration(e.to_string()))?;
        debug!(%url, "Sending Pinecone request");

        let response = self
            .client
            .post(url)
            .header("Api-Key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        read_json(response).await
    }
}

fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("ragchat/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(Error::VectorStore(format!(
            "Pinecone request failed with status {}: {}",
            status, text
        )));
    }

    // Some endpoints answer with an empty body
    let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
    serde_json::from_str(text)
        .map_err(|e| Error::VectorStore(format!("Invalid Pinecone response: {}", e)))
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn upsert(&self, documents: Vec<VectorDocument>) -> Result<usize> {
        let mut written = 0;

        for batch in documents.chunks(UPSERT_BATCH_SIZE) {
            let vectors = batch
                .iter()
                .map(|doc| {
                    let mut metadata = doc.metadata.clone();
                    metadata.insert(TEXT_KEY.to_string(), json!(doc.content));
                    UpsertVector {
                        id: &doc.id,
                        values: &doc.embedding,
                        metadata,
                    }
                })
                .collect();

            let request = UpsertRequest {
                vectors,
                namespace: &self.config.namespace,
            };
            let response: UpsertResponse = self.post("vectors/upsert", &request).await?;
            written += response.upserted_count;
        }

        Ok(written)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredDocument>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: &self.config.namespace,
        };

        let response: QueryResponse = self.post("query", &request).await?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| {
                let mut metadata = m.metadata;
                let content = match metadata.remove(TEXT_KEY) {
                    Some(serde_json::Value::String(s)) => s,
                    _ => String::new(),
                };
                ScoredDocument {
                    document: SourceDocument::new(content, metadata),
                    score: m.score,
                }
            })
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        let request = json!({
            "deleteAll": true,
            "namespace": self.config.namespace,
        });
        let _: serde_json::Value = self.post("vectors/delete", &request).await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let stats: IndexStats = self.post("describe_index_stats", &json!({})).await?;
        Ok(stats
            .namespaces
            .get(&self.config.namespace)
            .map(|ns| ns.vector_count)
            .unwrap_or(0))
    }

    fn describe(&self) -> String {
        format!(
            "Pinecone index \"{}\" (namespace \"{}\")",
            self.config.index, self.config.namespace
        )
    }
}
