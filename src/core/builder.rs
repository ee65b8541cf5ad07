//! Fluent configuration for a [`RagApplication`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragloom::{InMemoryVectorDb, RagApplicationBuilder, SimpleModel, TextLoader};
//!
//! let app = RagApplicationBuilder::new()
//!     .add_loader(Arc::new(TextLoader::new("Tokio is an async runtime for Rust.")))
//!     .set_vector_db(Arc::new(InMemoryVectorDb::new()))
//!     .set_model(SimpleModel::OpenAiGpt4)
//!     .set_temperature(0.2)
//!     .build()
//!     .await?;
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::application::RagApplication;
use crate::db::VectorDb;
use crate::llm::{Model, ModelSelection, SimpleModel};
use crate::loaders::Loader;
use crate::rag::cache::Cache;
use crate::rag::embeddings::{default_embedding_model, Embeddings};
use crate::types::{AppError, Result};

/// Token in the query template replaced by the user's query.
pub const QUERY_PLACEHOLDER: &str = "{0}";

/// Instruction template used when none is configured.
pub const DEFAULT_QUERY_TEMPLATE: &str = "You are a helpful human like chat bot. Use all the provided context to answer the query at the end. Answer in full.
If you don't know the answer, just say that you don't know, don't try to make up an answer.

Do not use words like context or training data when responding. Never mention the word context in your response.

You can say you may not have all the information but do not say that you are not a reliable source.

USER: {0}";

pub const DEFAULT_SEARCH_RESULT_COUNT: usize = 7;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Accumulates application settings and builds an initialized [`RagApplication`].
///
/// Every setter consumes and returns the builder so calls can be chained.
/// [`set_query_template`](Self::set_query_template) is the only fallible one.
pub struct RagApplicationBuilder {
    search_result_count: usize,
    loaders: Vec<Arc<dyn Loader>>,
    vector_db: Option<Arc<dyn VectorDb>>,
    temperature: f32,
    query_template: String,
    cache: Option<Arc<dyn Cache>>,
    embedding_model: Arc<dyn Embeddings>,
    loader_init: bool,
    selection: ModelSelection,
    model: Arc<dyn Model>,
}

impl RagApplicationBuilder {
    pub fn new() -> Self {
        let preset = SimpleModel::default();
        Self {
            search_result_count: DEFAULT_SEARCH_RESULT_COUNT,
            loaders: Vec::new(),
            vector_db: None,
            temperature: DEFAULT_TEMPERATURE,
            query_template: DEFAULT_QUERY_TEMPLATE.to_string(),
            cache: None,
            embedding_model: default_embedding_model(),
            loader_init: true,
            selection: ModelSelection::Preset(preset),
            model: preset.resolve(DEFAULT_TEMPERATURE),
        }
    }

    /// Build the application and run its initialization.
    ///
    /// Fails if no vector database was set, or if any component fails to
    /// initialize.
    pub async fn build(self) -> Result<RagApplication> {
        let app = RagApplication::new(self);
        app.init().await?;
        Ok(app)
    }

    // ============= Setters =============

    pub fn add_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loaders.push(loader);
        self
    }

    pub fn set_search_result_count(mut self, count: usize) -> Self {
        self.search_result_count = count;
        self
    }

    pub fn set_vector_db(mut self, vector_db: Arc<dyn VectorDb>) -> Self {
        self.vector_db = Some(vector_db);
        self
    }

    /// Replace the temperature. A preset model is rebuilt at the new
    /// temperature; a custom model is left as supplied.
    pub fn set_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        let selection = self.selection.clone();
        self.set_model(selection)
    }

    pub fn set_query_template(mut self, template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(QUERY_PLACEHOLDER) {
            return Err(AppError::InvalidInput(format!(
                "query template must include a placeholder for the query using {}",
                QUERY_PLACEHOLDER
            )));
        }

        self.query_template = template;
        Ok(self)
    }

    pub fn set_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn set_embedding_model(mut self, embedding_model: Arc<dyn Embeddings>) -> Self {
        self.embedding_model = embedding_model;
        self
    }

    /// Whether `build` ingests the registered loaders.
    pub fn set_loader_init(mut self, loader_init: bool) -> Self {
        self.loader_init = loader_init;
        self
    }

    /// Select a preset (resolved at the current temperature) or a custom model.
    pub fn set_model(mut self, model: impl Into<ModelSelection>) -> Self {
        let selection = model.into();
        self.model = match &selection {
            ModelSelection::Preset(preset) => preset.resolve(self.temperature),
            ModelSelection::Custom(model) => Arc::clone(model),
        };
        self.selection = selection;
        self
    }

    // ============= Getters =============

    pub fn loaders(&self) -> &[Arc<dyn Loader>] {
        &self.loaders
    }

    pub fn search_result_count(&self) -> usize {
        self.search_result_count
    }

    pub fn vector_db(&self) -> Option<&Arc<dyn VectorDb>> {
        self.vector_db.as_ref()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn query_template(&self) -> &str {
        &self.query_template
    }

    pub fn cache(&self) -> Option<&Arc<dyn Cache>> {
        self.cache.as_ref()
    }

    pub fn embedding_model(&self) -> &Arc<dyn Embeddings> {
        &self.embedding_model
    }

    pub fn loader_init(&self) -> bool {
        self.loader_init
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    pub fn model_selection(&self) -> &ModelSelection {
        &self.selection
    }

    pub(crate) fn into_parts(self) -> BuilderParts {
        BuilderParts {
            search_result_count: self.search_result_count,
            loaders: self.loaders,
            vector_db: self.vector_db,
            query_template: self.query_template,
            cache: self.cache,
            embedding_model: self.embedding_model,
            loader_init: self.loader_init,
            model: self.model,
        }
    }
}

impl Default for RagApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RagApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RagApplicationBuilder")
            .field("search_result_count", &self.search_result_count)
            .field(
                "loaders",
                &self.loaders.iter().map(|l| l.unique_id()).collect::<Vec<_>>(),
            )
            .field("vector_db", &self.vector_db.is_some())
            .field("temperature", &self.temperature)
            .field("cache", &self.cache.is_some())
            .field("embedding_model", &self.embedding_model.model_name())
            .field("loader_init", &self.loader_init)
            .field("model", &self.selection)
            .finish()
    }
}

/// Configuration snapshot handed from the builder to the application.
pub(crate) struct BuilderParts {
    pub search_result_count: usize,
    pub loaders: Vec<Arc<dyn Loader>>,
    pub vector_db: Option<Arc<dyn VectorDb>>,
    pub query_template: String,
    pub cache: Option<Arc<dyn Cache>>,
    pub embedding_model: Arc<dyn Embeddings>,
    pub loader_init: bool,
    pub model: Arc<dyn Model>,
}
