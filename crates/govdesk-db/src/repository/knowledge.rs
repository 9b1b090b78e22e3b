//! SurrealDB implementation of [`KnowledgeRepository`].

use govdesk_core::error::GovResult;
use govdesk_core::models::knowledge::{KnowledgeDocument, KnowledgeSource};
use govdesk_core::repository::KnowledgeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct SourceRow {
    tenant_id: String,
    source_id: String,
    source_type: String,
    name: String,
    description: String,
}

impl SourceRow {
    fn try_into_source(self) -> Result<KnowledgeSource, DbError> {
        Ok(KnowledgeSource {
            id: self.source_id,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            source_type: self.source_type,
            name: self.name,
            description: self.description,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct DocumentRow {
    tenant_id: String,
    document_id: String,
    source_id: String,
    title: String,
    doc_type: String,
    url: String,
    last_updated: String,
    confidence_score: f64,
    validated: bool,
    owner: String,
}

impl DocumentRow {
    fn try_into_document(self) -> Result<KnowledgeDocument, DbError> {
        Ok(KnowledgeDocument {
            id: self.document_id,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            source_id: self.source_id,
            title: self.title,
            doc_type: self.doc_type,
            url: self.url,
            last_updated: self.last_updated,
            confidence_score: self.confidence_score,
            validated: self.validated,
            owner: self.owner,
        })
    }
}

/// SurrealDB implementation of the knowledge base repository.
#[derive(Clone)]
pub struct SurrealKnowledgeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealKnowledgeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> KnowledgeRepository for SurrealKnowledgeRepository<C> {
    async fn insert_source(&self, source: KnowledgeSource) -> GovResult<KnowledgeSource> {
        let result = self
            .db
            .query(
                "CREATE knowledge_source SET \
                 tenant_id = $tenant_id, source_id = $source_id, \
                 source_type = $source_type, name = $name, \
                 description = $description",
            )
            .bind(("tenant_id", source.tenant_id.to_string()))
            .bind(("source_id", source.id.clone()))
            .bind(("source_type", source.source_type.clone()))
            .bind(("name", source.name.clone()))
            .bind(("description", source.description.clone()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, "knowledge_source"))?;

        Ok(source)
    }

    async fn insert_document(
        &self,
        document: KnowledgeDocument,
    ) -> GovResult<KnowledgeDocument> {
        let result = self
            .db
            .query(
                "CREATE knowledge_document SET \
                 tenant_id = $tenant_id, document_id = $document_id, \
                 source_id = $source_id, title = $title, \
                 doc_type = $doc_type, url = $url, \
                 last_updated = $last_updated, \
                 confidence_score = $confidence_score, \
                 validated = $validated, owner = $owner",
            )
            .bind(("tenant_id", document.tenant_id.to_string()))
            .bind(("document_id", document.id.clone()))
            .bind(("source_id", document.source_id.clone()))
            .bind(("title", document.title.clone()))
            .bind(("doc_type", document.doc_type.clone()))
            .bind(("url", document.url.clone()))
            .bind(("last_updated", document.last_updated.clone()))
            .bind(("confidence_score", document.confidence_score))
            .bind(("validated", document.validated))
            .bind(("owner", document.owner.clone()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, "knowledge_document"))?;

        Ok(document)
    }

    async fn list_sources(&self, tenant_id: Uuid) -> GovResult<Vec<KnowledgeSource>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM knowledge_source \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY source_id ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SourceRow> = result.take(0).map_err(DbError::from)?;
        let sources = rows
            .into_iter()
            .map(|row| row.try_into_source())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(sources)
    }

    async fn list_documents(&self, tenant_id: Uuid) -> GovResult<Vec<KnowledgeDocument>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM knowledge_document \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY document_id ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let documents = rows
            .into_iter()
            .map(|row| row.try_into_document())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(documents)
    }

    async fn get_document(
        &self,
        tenant_id: Uuid,
        document_id: &str,
    ) -> GovResult<KnowledgeDocument> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM knowledge_document \
                 WHERE tenant_id = $tenant_id \
                 AND document_id = $document_id",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("document_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "knowledge_document".into(),
            id: document_id.to_string(),
        })?;

        Ok(row.try_into_document()?)
    }
}
