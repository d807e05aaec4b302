//! Multi-page POI fetch for `PoiClient`.

use std::time::Duration;

use eatwhat_core::SyncItem;

use crate::types::RawPoi;

use super::{PoiClient, SearchAnchor, MAX_PAGES, PAGE_SIZE};

/// Why pagination stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStop {
    /// A page held fewer than [`PAGE_SIZE`] POIs: end of data.
    ShortPage { page: u32, len: usize },
    /// A page came back with no POIs.
    EmptyPage { page: u32 },
    /// [`MAX_PAGES`] full pages were fetched.
    PageLimit,
    /// The provider answered with a failure status; earlier pages are kept.
    Rejected { page: u32, info: String },
    /// The request itself failed; everything fetched so far was discarded.
    TransportFailure { page: u32, error: String },
}

/// Result of [`PoiClient::fetch_all`]. Never an error: failures degrade to
/// fewer (possibly zero) items plus the reason in `stop`.
#[derive(Debug, Clone)]
pub struct PoiFetch {
    pub items: Vec<RawPoi>,
    pub pages_requested: u32,
    pub stop: FetchStop,
}

impl PoiFetch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps every usable POI onto a [`SyncItem`], dropping records without a
    /// name or coordinates.
    #[must_use]
    pub fn sync_items(&self) -> Vec<SyncItem> {
        let items: Vec<SyncItem> = self.items.iter().filter_map(RawPoi::to_sync_item).collect();
        let dropped = self.items.len() - items.len();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped POIs without name or coordinates");
        }
        items
    }
}

impl PoiClient {
    /// Fetches up to [`MAX_PAGES`] pages of [`PAGE_SIZE`] POIs, strictly one
    /// after another.
    ///
    /// Stops after a short or empty page, and never requests the page after
    /// a stop. A provider rejection keeps the pages already accumulated; a
    /// transport failure (network, HTTP status, malformed body) discards
    /// them and yields an empty fetch.
    pub async fn fetch_all(&self, anchor: &SearchAnchor) -> PoiFetch {
        let mut items: Vec<RawPoi> = Vec::new();
        let mut pages_requested = 0u32;

        for page in 1..=MAX_PAGES {
            if page > 1 && self.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.inter_request_delay_ms)).await;
            }
            pages_requested = page;

            let pois = match self.fetch_page(anchor, page).await {
                Ok(pois) => pois,
                Err(err) if err.is_transport_failure() => {
                    tracing::warn!(
                        %anchor,
                        page,
                        discarded = items.len(),
                        error = %err,
                        "POI fetch failed; discarding accumulated results"
                    );
                    return PoiFetch {
                        items: Vec::new(),
                        pages_requested,
                        stop: FetchStop::TransportFailure {
                            page,
                            error: err.to_string(),
                        },
                    };
                }
                Err(err) => {
                    tracing::warn!(
                        %anchor,
                        page,
                        kept = items.len(),
                        error = %err,
                        "provider rejected page; keeping accumulated results"
                    );
                    let info = match err {
                        crate::ProviderError::Rejected { info, .. } => info,
                        other => other.to_string(),
                    };
                    return PoiFetch {
                        items,
                        pages_requested,
                        stop: FetchStop::Rejected { page, info },
                    };
                }
            };

            let len = pois.len();
            tracing::debug!(%anchor, page, len, "fetched POI page");
            if len == 0 {
                return PoiFetch {
                    items,
                    pages_requested,
                    stop: FetchStop::EmptyPage { page },
                };
            }
            items.extend(pois);
            if len < PAGE_SIZE {
                return PoiFetch {
                    items,
                    pages_requested,
                    stop: FetchStop::ShortPage { page, len },
                };
            }
        }

        tracing::info!(%anchor, count = items.len(), "POI fetch hit page limit");
        PoiFetch {
            items,
            pages_requested,
            stop: FetchStop::PageLimit,
        }
    }
}
