//! Reservation Rendering Strategies
//!
//! Three strategies turn a set of reservation block IDs into the markdown
//! body of the canonical reservation block:
//!
//! - `Embed` wraps a store query over the IDs in an embed marker; the
//!   store resolves the blocks at display time, so no lookups happen here
//! - `Link` renders a checkbox list of navigational links
//! - `Ref` renders the same list with inline content references
//!
//! The variants dispatch to pure rendering functions over pre-resolved
//! item snippets; only the resolution step talks to the store. A missing
//! block renders as an explicit struck-through "not found" entry instead
//! of failing the whole render.

use std::fmt;
use std::str::FromStr;

use crate::services::error::ServiceError;
use crate::store::DocStore;

/// Maximum snippet length before truncation.
const SNIPPET_CHARS: usize = 50;

/// Rendering strategy for the canonical reservation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderVariant {
    /// Embedded store query over the reservation IDs
    Embed,
    /// Checkbox list of navigational links
    Link,
    /// Checkbox list of inline content references
    Ref,
}

impl FromStr for RenderVariant {
    type Err = ServiceError;

    /// Parse a variant name. Unrecognized names fail before any store
    /// call is issued.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "embed" => Ok(Self::Embed),
            "link" => Ok(Self::Link),
            "ref" => Ok(Self::Ref),
            other => Err(ServiceError::unknown_variant(other)),
        }
    }
}

impl fmt::Display for RenderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Embed => "embed",
            Self::Link => "link",
            Self::Ref => "ref",
        };
        f.write_str(name)
    }
}

/// A reservation ID with its looked-up snippet; `None` when the block no
/// longer exists in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedItem {
    id: String,
    snippet: Option<String>,
}

/// Truncate to at most `limit` characters, appending an ellipsis when
/// anything was cut. Operates on character boundaries.
fn clip(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let clipped: String = text.chars().take(limit).collect();
    format!("{clipped}...")
}

/// Look up each reservation block, clipping found content into snippets.
async fn resolve_items(
    store: &dyn DocStore,
    ids: &[String],
) -> Result<Vec<ResolvedItem>, ServiceError> {
    let mut items = Vec::with_capacity(ids.len());
    for id in ids {
        let snippet = store
            .get_block(id)
            .await?
            .map(|block| clip(&block.content, SNIPPET_CHARS));
        items.push(ResolvedItem {
            id: id.clone(),
            snippet,
        });
    }
    Ok(items)
}

/// Embed variant: a store query wrapped in an embed marker.
fn render_embed(ids: &[String]) -> String {
    let quoted: Vec<String> = ids.iter().map(|id| format!("\"{id}\"")).collect();
    format!(
        "{{{{select * from blocks where id in ({})}}}}",
        quoted.join(",")
    )
}

/// Link variant entry for a resolved item.
fn link_entry(item: &ResolvedItem) -> String {
    match &item.snippet {
        Some(snippet) => format!("* [ ] [{snippet}](siyuan://blocks/{})", item.id),
        None => format!("* [x] `{}` not found", item.id),
    }
}

/// Ref variant entry for a resolved item.
fn ref_entry(item: &ResolvedItem) -> String {
    match &item.snippet {
        Some(snippet) => format!("* [ ] (({} \"{snippet}\"))", item.id),
        None => format!("* [x] `{}` not found", item.id),
    }
}

/// Render items through a per-entry function, one line per item in input
/// order.
fn render_list(items: &[ResolvedItem], entry: fn(&ResolvedItem) -> String) -> String {
    items.iter().map(entry).collect::<Vec<_>>().join("\n")
}

/// Produce the canonical reservation block content for a variant.
pub async fn render_content(
    store: &dyn DocStore,
    variant: RenderVariant,
    ids: &[String],
) -> Result<String, ServiceError> {
    match variant {
        RenderVariant::Embed => Ok(render_embed(ids)),
        RenderVariant::Link => {
            let items = resolve_items(store, ids).await?;
            Ok(render_list(&items, link_entry))
        }
        RenderVariant::Ref => {
            let items = resolve_items(store, ids).await?;
            Ok(render_list(&items, ref_entry))
        }
    }
}
