// 6.7 margin/history.rs: event history for one position. one filter over the configured
// block range, fully materialized. no pagination: a busy contract over a wide range will
// hand back everything at once.

use alloy_primitives::B256;
use alloy_sol_types::SolEvent;
use chrono::DateTime;
use futures::future::try_join_all;
use tracing::debug;

use super::core::Margin;
use super::results::MarginError;
use crate::abi::IMargin;
use crate::events::{LoggedEvent, PositionClosedEvent, PositionOpenedEvent, TimestampedEvent};
use crate::transport::{BlockTag, LogFilter, MarginTransport, RawLog};
use crate::types::PositionId;

impl<T: MarginTransport> Margin<T> {
    pub async fn get_all_position_opened_events(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<LoggedEvent<PositionOpenedEvent>>, MarginError> {
        let logs = self
            .fetch_logs("PositionOpened", IMargin::PositionOpened::SIGNATURE_HASH, position_id)
            .await?;

        logs.iter()
            .map(|log| {
                let decoded = decode_log::<IMargin::PositionOpened>("PositionOpened", log)?;
                Ok(LoggedEvent {
                    block_number: log.block_number,
                    transaction_hash: log.transaction_hash,
                    args: PositionOpenedEvent::from(decoded),
                })
            })
            .collect()
    }

    // 6.7.1: closed events joined with their block's timestamp. lookups run concurrently
    // and the first failure aborts the whole read.
    pub async fn get_all_position_closed_events(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<TimestampedEvent<PositionClosedEvent>>, MarginError> {
        let logs = self
            .fetch_logs("PositionClosed", IMargin::PositionClosed::SIGNATURE_HASH, position_id)
            .await?;

        let timestamps = try_join_all(logs.iter().map(|log| async move {
            self.transport
                .block_timestamp(log.block_number)
                .await
                .map_err(|source| MarginError::remote("getBlock", source))
        }))
        .await?;

        logs.iter()
            .zip(timestamps)
            .map(|(log, seconds)| {
                let decoded = decode_log::<IMargin::PositionClosed>("PositionClosed", log)?;
                let timestamp = i64::try_from(seconds)
                    .ok()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
                    .ok_or_else(|| {
                        MarginError::decode("getBlock", format!("block timestamp {seconds} out of range"))
                    })?;
                Ok(TimestampedEvent {
                    block_number: log.block_number,
                    timestamp,
                    args: PositionClosedEvent::from(decoded),
                })
            })
            .collect()
    }

    async fn fetch_logs(
        &self,
        event: &'static str,
        signature: B256,
        position_id: PositionId,
    ) -> Result<Vec<RawLog>, MarginError> {
        let filter = LogFilter {
            address: self.config.margin_address,
            event_signature: signature,
            position_id: position_id.0,
            from_block: BlockTag::Number(self.config.events_from_block),
            to_block: BlockTag::Latest,
        };

        let logs = self
            .transport
            .get_logs(&filter)
            .await
            .map_err(|source| MarginError::remote(event, source))?;

        debug!(event, position = %position_id, count = logs.len(), "fetched logs");
        Ok(logs)
    }
}

fn decode_log<E: SolEvent>(event: &'static str, log: &RawLog) -> Result<E, MarginError> {
    E::decode_raw_log(log.topics.iter().copied(), &log.data, true)
        .map_err(|err| MarginError::decode(event, err))
}
