//! Provider adapters.
//!
//! Yahoo Finance is the only provider. It is reached through two history
//! interfaces (ranged chart, then bounded download on the secondary host)
//! and one metadata interface (quoteSummary).

pub mod yahoo;

use std::sync::Arc;

pub use yahoo::{
    YahooChartSource, YahooClient, YahooDownloadSource, YahooMetadataSource, YAHOO_COOKIE_URL,
    YAHOO_QUERY_BASE,
};

use crate::clock::Clock;
use crate::data_source::{HistorySource, MetadataSource};

/// History chain (chart first, download second) and metadata source sharing
/// one Yahoo session.
pub fn yahoo_sources(
    client: Arc<YahooClient>,
    clock: Arc<dyn Clock>,
) -> (Vec<Arc<dyn HistorySource>>, Arc<dyn MetadataSource>) {
    let chain: Vec<Arc<dyn HistorySource>> = vec![
        Arc::new(YahooChartSource::new(Arc::clone(&client))),
        Arc::new(YahooDownloadSource::new(Arc::clone(&client), clock)),
    ];
    let metadata: Arc<dyn MetadataSource> = Arc::new(YahooMetadataSource::new(client));
    (chain, metadata)
}
