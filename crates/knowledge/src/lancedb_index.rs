//! LanceDB-backed vector index.
//!
//! One table per collection with columns `id`, `text`, `metadata` (JSON
//! text) and `vector`. Search uses cosine distance, read from LanceDB's
//! `_distance` column, so lower scores are closer. Resetting drops the
//! table; the next write recreates it at the new vector size.

use crate::types::{Metadata, Passage, ScoreKind, ScoredPassage};
use crate::vector_index::{check_lengths, VectorIndex};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, LargeBinaryArray, LargeStringArray, RecordBatch,
    RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use docent_core::{AppError, AppResult};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const VECTOR_COLUMN: &str = "vector";
const DISTANCE_COLUMN: &str = "_distance";
const EXTENSION_NAME_KEY: &str = "ARROW:extension:name";
const JSON_EXTENSION: &str = "arrow.json";

/// LanceDB-backed vector index for passages.
pub struct LanceDbIndex {
    conn: Connection,
    uri: String,
    collection: String,
    json_metadata: bool,
    table: RwLock<Option<Table>>,
}

impl LanceDbIndex {
    /// Connect to the database at `uri` and open `collection` if it exists.
    ///
    /// The table is created on first write, sized to the first embedding.
    pub async fn open(uri: &str, collection: &str, json_metadata: bool) -> AppResult<Self> {
        if !uri.contains("://") {
            std::fs::create_dir_all(uri).map_err(|e| {
                AppError::IndexUnavailable(format!("Failed to create index directory {}: {}", uri, e))
            })?;
        }

        let conn = lancedb::connect(uri)
            .execute()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to connect to LanceDB: {}", e)))?;

        let table_names = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to list tables: {}", e)))?;

        let existing = if table_names.iter().any(|name| name == collection) {
            let table = conn
                .open_table(collection)
                .execute()
                .await
                .map_err(|e| AppError::IndexUnavailable(format!("Failed to open table: {}", e)))?;
            Some(table)
        } else {
            None
        };

        tracing::debug!(
            "Opened LanceDB at {} (collection '{}', exists: {})",
            uri,
            collection,
            existing.is_some()
        );

        Ok(Self {
            conn,
            uri: uri.to_string(),
            collection: collection.to_string(),
            json_metadata,
            table: RwLock::new(existing),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Arrow schema for a collection of `embedding_dim`-sized vectors.
    pub fn create_schema(embedding_dim: usize, json_metadata: bool) -> Arc<Schema> {
        let mut metadata_field = Field::new("metadata", DataType::Utf8, false);
        if json_metadata {
            metadata_field = metadata_field.with_metadata(HashMap::from([(
                EXTENSION_NAME_KEY.to_string(),
                JSON_EXTENSION.to_string(),
            )]));
        }

        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            metadata_field,
            Field::new(
                VECTOR_COLUMN,
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    embedding_dim as i32,
                ),
                false,
            ),
        ]))
    }

    async fn current_table(&self) -> Option<Table> {
        self.table.read().await.clone()
    }

    async fn table_for_write(&self, embedding_dim: usize) -> AppResult<Table> {
        let mut slot = self.table.write().await;

        let table = match slot.as_ref() {
            Some(table) => table.clone(),
            None => {
                let schema = Self::create_schema(embedding_dim, self.json_metadata);
                let empty_batch = RecordBatch::new_empty(schema.clone());

                tracing::info!(
                    "Creating collection '{}' ({} dimensions)",
                    self.collection,
                    embedding_dim
                );

                let table = self
                    .conn
                    .create_table(
                        &self.collection,
                        RecordBatchIterator::new(vec![Ok(empty_batch)], schema),
                    )
                    .execute()
                    .await
                    .map_err(|e| {
                        AppError::IndexUnavailable(format!("Failed to create table: {}", e))
                    })?;
                *slot = Some(table.clone());
                table
            }
        };

        self.check_dimensions(&table, embedding_dim).await?;
        Ok(table)
    }

    /// Reject vectors whose size differs from the collection's.
    async fn check_dimensions(&self, table: &Table, embedding_dim: usize) -> AppResult<()> {
        let stored_dim = Self::table_dimensions(table).await?;
        if stored_dim != Some(embedding_dim) {
            return Err(AppError::Config(format!(
                "Collection '{}' stores {} vectors but the embedder produced {} dimensions; \
                 run `docent reset` or choose another collection",
                self.collection,
                stored_dim.map_or("non-vector".to_string(), |d| format!("{}-dimensional", d)),
                embedding_dim
            )));
        }
        Ok(())
    }

    async fn table_dimensions(table: &Table) -> AppResult<Option<usize>> {
        let schema = table
            .schema()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to read schema: {}", e)))?;

        Ok(schema
            .field_with_name(VECTOR_COLUMN)
            .ok()
            .and_then(|field| match field.data_type() {
                DataType::FixedSizeList(_, size) => usize::try_from(*size).ok(),
                _ => None,
            }))
    }

    fn to_batch(
        &self,
        ids: &[String],
        passages: &[Passage],
        embeddings: &[Vec<f32>],
        embedding_dim: usize,
    ) -> AppResult<RecordBatch> {
        let schema = Self::create_schema(embedding_dim, self.json_metadata);

        let metadata_json = passages
            .iter()
            .map(|p| serde_json::to_string(&p.metadata))
            .collect::<Result<Vec<_>, _>>()?;

        let flat: Vec<f32> = embeddings.iter().flatten().copied().collect();
        let vectors = FixedSizeListArray::try_new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            embedding_dim as i32,
            Arc::new(Float32Array::from(flat)),
            None,
        )
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to build vector column: {}", e)))?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from_iter_values(ids.iter())),
                Arc::new(StringArray::from_iter_values(
                    passages.iter().map(|p| p.content.as_str()),
                )),
                Arc::new(StringArray::from_iter_values(metadata_json.iter())),
                Arc::new(vectors),
            ],
        )
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to create RecordBatch: {}", e)))
    }

    fn from_batch(batch: &RecordBatch) -> AppResult<Vec<ScoredPassage>> {
        let ids = string_column(batch, "id")?;
        let texts = string_column(batch, "text")?;
        let distances = batch
            .column_by_name(DISTANCE_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
            .ok_or_else(|| AppError::IndexUnavailable("Missing _distance column".to_string()))?;
        let metadata = batch
            .column_by_name("metadata")
            .ok_or_else(|| AppError::IndexUnavailable("Missing metadata column".to_string()))?;

        (0..batch.num_rows())
            .map(|row| {
                Ok(ScoredPassage {
                    id: ids.value(row).to_string(),
                    passage: Passage::new(texts.value(row), read_metadata(metadata.as_ref(), row)?),
                    score: distances.value(row),
                })
            })
            .collect()
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> AppResult<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| AppError::IndexUnavailable(format!("Invalid {} column", name)))
}

/// Parse the metadata cell; the store may hand JSON back as large text.
fn read_metadata(column: &dyn Array, row: usize) -> AppResult<Metadata> {
    let any = column.as_any();
    let parsed = if let Some(values) = any.downcast_ref::<StringArray>() {
        serde_json::from_str(values.value(row))
    } else if let Some(values) = any.downcast_ref::<LargeStringArray>() {
        serde_json::from_str(values.value(row))
    } else if let Some(values) = any.downcast_ref::<LargeBinaryArray>() {
        serde_json::from_slice(values.value(row))
    } else {
        return Err(AppError::IndexUnavailable(format!(
            "Unsupported metadata column type: {:?}",
            column.data_type()
        )));
    };

    parsed.map_err(|e| {
        AppError::IndexUnavailable(format!("Unreadable metadata on row {}: {}", row, e))
    })
}

#[async_trait::async_trait]
impl VectorIndex for LanceDbIndex {
    fn backend_name(&self) -> &str {
        "lancedb"
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Distance
    }

    async fn upsert(
        &self,
        ids: &[String],
        passages: &[Passage],
        embeddings: &[Vec<f32>],
    ) -> AppResult<usize> {
        check_lengths(ids, passages, embeddings)?;
        let Some(first) = embeddings.first() else {
            return Ok(0);
        };

        let embedding_dim = first.len();
        if embeddings.iter().any(|e| e.len() != embedding_dim) {
            return Err(AppError::EmbeddingService(
                "Embeddings in one batch have different dimensions".to_string(),
            ));
        }

        let batch = self.to_batch(ids, passages, embeddings, embedding_dim)?;
        let table = self.table_for_write(embedding_dim).await?;

        let schema = batch.schema();
        table
            .add(RecordBatchIterator::new(vec![Ok(batch)], schema))
            .execute()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to add passages: {}", e)))?;

        tracing::debug!("Inserted {} passages into '{}'", ids.len(), self.collection);
        Ok(ids.len())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> AppResult<Vec<ScoredPassage>> {
        let Some(table) = self.current_table().await else {
            tracing::debug!("Collection '{}' does not exist yet", self.collection);
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        self.check_dimensions(&table, embedding.len()).await?;

        let batches: Vec<RecordBatch> = table
            .query()
            .nearest_to(embedding.to_vec())
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to create query: {}", e)))?
            .column(VECTOR_COLUMN)
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to execute search: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to collect results: {}", e)))?;

        let mut results = Vec::new();
        for batch in &batches {
            results.extend(Self::from_batch(batch)?);
        }
        results.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    async fn count(&self) -> AppResult<usize> {
        match self.current_table().await {
            Some(table) => table
                .count_rows(None)
                .await
                .map_err(|e| AppError::IndexUnavailable(format!("Failed to count rows: {}", e))),
            None => Ok(0),
        }
    }

    async fn reset(&self) -> AppResult<()> {
        let mut slot = self.table.write().await;
        if slot.is_some() {
            self.conn
                .drop_table(&self.collection, &[])
                .await
                .map_err(|e| AppError::IndexUnavailable(format!("Failed to reset index: {}", e)))?;
            *slot = None;
        }

        tracing::info!("Reset collection '{}'", self.collection);
        Ok(())
    }
}
