/// Single-flight quote fetch task
///
/// Each fetch is tagged with the generation it was started for. The
/// supervisor aborts the previous task when a new fetch starts, and the
/// generation check on apply guarantees a late result for an abandoned key
/// can never overwrite newer state, even if the abort lost the race.

use crate::api::{OrderRequest, QuoteSource};
use crate::engine::EngineEvent;
use crate::logger::{self, LogTag};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub(crate) fn spawn_quote_fetch(
    source: Arc<dyn QuoteSource>,
    request: OrderRequest,
    generation: u64,
    events: UnboundedSender<EngineEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        logger::debug(
            LogTag::Quote,
            &format!(
                "Fetching order gen={}: {} {} -> {}",
                generation, request.amount_raw, request.input_mint, request.output_mint
            ),
        );

        let result = match source.fetch_order(&request).await {
            Ok(response) => response.into_snapshot(),
            Err(e) => Err(e),
        };

        // Receiver gone means the engine unmounted mid-fetch
        let _ = events.send(EngineEvent::QuoteResult { generation, result });
    })
}
