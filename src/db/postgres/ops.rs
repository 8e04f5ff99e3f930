use async_trait::async_trait;
use log::error;

use super::PostgresStore;
use crate::db::Store;

#[async_trait]
impl Store for PostgresStore {
    async fn load_raw(&self, kind: &'static str, id: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let client = self.pool.get().await?;
        let query = "SELECT body FROM binbook.entities WHERE kind = $1 AND id = $2";

        let row = client.query_opt(query, &[&kind, &id]).await?;

        Ok(row.map(|r| r.get("body")))
    }

    async fn save_raw(&self, kind: &'static str, id: &str, body: serde_json::Value) -> anyhow::Result<()> {
        let client = self.pool.get().await?;
        let query = r#"
            INSERT INTO binbook.entities (kind, id, body, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (kind, id) DO UPDATE SET
                body = EXCLUDED.body,
                updated_at = EXCLUDED.updated_at
        "#;

        client.execute(query, &[&kind, &id, &body]).await.map_err(|e| {
            error!("Failed to upsert {} {}: {:?}", kind, id, e);
            e
        })?;

        Ok(())
    }
}
