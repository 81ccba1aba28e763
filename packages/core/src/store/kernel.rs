//! Kernel HTTP Client
//!
//! `DocStore` implementation speaking the store kernel's JSON API over
//! HTTP. Every call is a POST whose response is wrapped in a
//! `{code, msg, data}` envelope; a non-zero `code` is surfaced as
//! `StoreError::Api` without retry.
//!
//! Read filters are lowered to the kernel's SQL dialect, mirroring the
//! queries the kernel itself documents: plain `blocks` table selects for
//! documents and markers, and a `blocks`/`attributes` join for the
//! reservation due-date query.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::models::{ContentBlock, Notebook, NotebookConf, Reservation};
use crate::store::{
    BlockFilter, DocStore, DueDateFilter, InsertPosition, StoreError, RESERVATION_ATTR,
};

/// Response envelope used by every kernel endpoint.
#[derive(Debug, Deserialize)]
struct KernelReply<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

/// Transaction result shape returned by block insertion endpoints.
#[derive(Debug, Deserialize)]
struct Transaction {
    #[serde(rename = "doOperations")]
    do_operations: Vec<Operation>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    id: String,
}

/// HTTP client for the document store kernel.
#[derive(Debug, Clone)]
pub struct KernelClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl KernelClient {
    /// Create a client for the kernel at `base_url` (e.g.
    /// `http://127.0.0.1:6806`), optionally authenticating with an API
    /// token.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token,
            http: reqwest::Client::new(),
        }
    }

    /// POST a payload to an endpoint and unwrap the reply envelope.
    async fn post<P, T>(&self, endpoint: &str, payload: &P) -> Result<Option<T>, StoreError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(endpoint, "kernel request");

        let mut request = self.http.post(&url).json(payload);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Http(format!(
                "{endpoint} returned HTTP {status}"
            )));
        }

        let reply: KernelReply<T> = response
            .json()
            .await
            .map_err(|e| StoreError::decode(format!("{endpoint}: {e}")))?;
        if reply.code != 0 {
            return Err(StoreError::api(reply.code, reply.msg));
        }
        Ok(reply.data)
    }

    /// Like [`post`](Self::post), but require the envelope to carry data.
    async fn post_expect<P, T>(&self, endpoint: &str, payload: &P) -> Result<T, StoreError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(endpoint, payload)
            .await?
            .ok_or_else(|| StoreError::decode(format!("{endpoint}: reply carried no data")))
    }

    /// Run a SQL statement against the kernel query endpoint.
    async fn sql<T: DeserializeOwned>(&self, stmt: String) -> Result<Vec<T>, StoreError> {
        let rows: Option<Vec<T>> = self.post("/api/query/sql", &json!({ "stmt": stmt })).await?;
        Ok(rows.unwrap_or_default())
    }
}

/// Escape a string for inclusion in a single-quoted SQL literal.
fn sql_quote(value: &str) -> String {
    value.replace('\'', "''")
}

/// Lower a structured block filter to the kernel's SQL dialect.
///
/// `ChildBlocks` is not lowered here; it maps to a dedicated endpoint.
fn block_filter_sql(filter: &BlockFilter) -> Option<String> {
    match filter {
        BlockFilter::DocsByHpath { hpath, notebook_id } => {
            let mut stmt = format!(
                "select * from blocks where type = 'd' and hpath = '{}'",
                sql_quote(hpath)
            );
            if let Some(notebook) = notebook_id {
                stmt.push_str(&format!(" and box = '{}'", sql_quote(notebook)));
            }
            Some(stmt)
        }
        BlockFilter::MarkedInDoc { doc_id, name } => Some(format!(
            "select * from blocks where root_id = '{}' and name = '{}'",
            sql_quote(doc_id),
            sql_quote(name)
        )),
        BlockFilter::ChildBlocks { .. } => None,
    }
}

/// Lower a due-date filter to the reservation join query.
fn reservation_sql(filter: &DueDateFilter) -> String {
    let cond = match filter {
        DueDateFilter::Equals(date) => format!("A.value = '{}'", sql_quote(date)),
        DueDateFilter::AtLeast(date) => format!("A.value >= '{}'", sql_quote(date)),
    };
    format!(
        "select B.id as id, B.content as content, A.value as date \
         from blocks as B inner join attributes as A \
         on (A.block_id = B.id and A.name = '{RESERVATION_ATTR}' and {cond}) \
         order by A.value"
    )
}

#[async_trait]
impl DocStore for KernelClient {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>, StoreError> {
        #[derive(Deserialize)]
        struct Reply {
            notebooks: Vec<Notebook>,
        }
        let reply: Reply = self
            .post_expect("/api/notebook/lsNotebooks", &json!({}))
            .await?;
        Ok(reply.notebooks)
    }

    async fn notebook_conf(&self, notebook_id: &str) -> Result<NotebookConf, StoreError> {
        #[derive(Deserialize)]
        struct Reply {
            conf: NotebookConf,
        }
        let reply: Reply = self
            .post_expect(
                "/api/notebook/getNotebookConf",
                &json!({ "notebook": notebook_id }),
            )
            .await?;
        Ok(reply.conf)
    }

    async fn render_sprig(&self, template: &str) -> Result<String, StoreError> {
        let rendered: Option<String> = self
            .post("/api/template/renderSprig", &json!({ "sprig": template }))
            .await?;
        Ok(rendered.unwrap_or_default())
    }

    async fn query_blocks(&self, filter: &BlockFilter) -> Result<Vec<ContentBlock>, StoreError> {
        match block_filter_sql(filter) {
            Some(stmt) => self.sql(stmt).await,
            None => {
                // Child blocks have a dedicated endpoint; the SQL table does
                // not expose heading scopes directly.
                let BlockFilter::ChildBlocks { parent_id } = filter else {
                    unreachable!("only ChildBlocks lacks a SQL lowering");
                };
                let children: Option<Vec<ContentBlock>> = self
                    .post("/api/block/getChildBlocks", &json!({ "id": parent_id }))
                    .await?;
                Ok(children.unwrap_or_default())
            }
        }
    }

    async fn query_reservations(
        &self,
        filter: &DueDateFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.sql(reservation_sql(filter)).await
    }

    async fn create_doc(
        &self,
        notebook_id: &str,
        hpath: &str,
        markdown: &str,
    ) -> Result<String, StoreError> {
        self.post_expect(
            "/api/filetree/createDocWithMd",
            &json!({
                "notebook": notebook_id,
                "path": hpath,
                "markdown": markdown,
            }),
        )
        .await
    }

    async fn move_block(
        &self,
        block_id: &str,
        previous_id: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let _: Option<serde_json::Value> = self
            .post(
                "/api/block/moveBlock",
                &json!({
                    "id": block_id,
                    "previousID": previous_id,
                    "parentID": parent_id,
                }),
            )
            .await?;
        Ok(())
    }

    async fn insert_block(
        &self,
        doc_id: &str,
        markdown: &str,
        position: InsertPosition,
    ) -> Result<String, StoreError> {
        let endpoint = match position {
            InsertPosition::Top => "/api/block/prependBlock",
            InsertPosition::Bottom => "/api/block/appendBlock",
        };
        let transactions: Vec<Transaction> = self
            .post_expect(
                endpoint,
                &json!({
                    "parentID": doc_id,
                    "dataType": "markdown",
                    "data": markdown,
                }),
            )
            .await?;
        transactions
            .first()
            .and_then(|tx| tx.do_operations.first())
            .map(|op| op.id.clone())
            .ok_or_else(|| StoreError::decode(format!("{endpoint}: no operation in reply")))
    }

    async fn update_block(&self, block_id: &str, markdown: &str) -> Result<(), StoreError> {
        let _: Option<serde_json::Value> = self
            .post(
                "/api/block/updateBlock",
                &json!({
                    "id": block_id,
                    "dataType": "markdown",
                    "data": markdown,
                }),
            )
            .await?;
        Ok(())
    }

    async fn set_block_attrs(
        &self,
        block_id: &str,
        attrs: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let _: Option<serde_json::Value> = self
            .post(
                "/api/attr/setBlockAttrs",
                &json!({ "id": block_id, "attrs": attrs }),
            )
            .await?;
        Ok(())
    }

    async fn get_block(&self, block_id: &str) -> Result<Option<ContentBlock>, StoreError> {
        let stmt = format!(
            "select * from blocks where id = '{}'",
            sql_quote(block_id)
        );
        let mut rows: Vec<ContentBlock> = self.sql(stmt).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_by_hpath_lowering_scopes_to_notebook() {
        let stmt = block_filter_sql(&BlockFilter::DocsByHpath {
            hpath: "/daily note/2025/08/2025-08-31".to_string(),
            notebook_id: Some("nb-1".to_string()),
        })
        .unwrap();
        assert_eq!(
            stmt,
            "select * from blocks where type = 'd' and \
             hpath = '/daily note/2025/08/2025-08-31' and box = 'nb-1'"
        );
    }

    #[test]
    fn docs_by_hpath_lowering_without_notebook() {
        let stmt = block_filter_sql(&BlockFilter::DocsByHpath {
            hpath: "/x".to_string(),
            notebook_id: None,
        })
        .unwrap();
        assert!(!stmt.contains("box"));
    }

    #[test]
    fn marker_lowering_is_scoped_to_document() {
        let stmt = block_filter_sql(&BlockFilter::MarkedInDoc {
            doc_id: "doc-1".to_string(),
            name: "Reservation".to_string(),
        })
        .unwrap();
        assert_eq!(
            stmt,
            "select * from blocks where root_id = 'doc-1' and name = 'Reservation'"
        );
    }

    #[test]
    fn child_blocks_have_no_sql_lowering() {
        assert!(block_filter_sql(&BlockFilter::ChildBlocks {
            parent_id: "h1".to_string(),
        })
        .is_none());
    }

    #[test]
    fn reservation_lowering_orders_ascending() {
        let stmt = reservation_sql(&DueDateFilter::AtLeast("20250831".to_string()));
        assert!(stmt.contains("A.name = 'custom-reservation'"));
        assert!(stmt.contains("A.value >= '20250831'"));
        assert!(stmt.ends_with("order by A.value"));
    }

    #[test]
    fn sql_quote_doubles_single_quotes() {
        assert_eq!(sql_quote("it's"), "it''s");
    }

    #[test]
    fn envelope_with_nonzero_code_is_an_api_error() {
        let reply: KernelReply<serde_json::Value> =
            serde_json::from_str(r#"{"code": -1, "msg": "notebook not found", "data": null}"#)
                .unwrap();
        assert_eq!(reply.code, -1);
        assert_eq!(reply.msg, "notebook not found");
        assert!(reply.data.is_none());
    }

    #[test]
    fn transaction_reply_exposes_new_block_id() {
        let txs: Vec<Transaction> = serde_json::from_str(
            r#"[{"doOperations": [{"id": "20250831120000-abcdefg"}]}]"#,
        )
        .unwrap();
        assert_eq!(txs[0].do_operations[0].id, "20250831120000-abcdefg");
    }
}
