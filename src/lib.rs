// margin-client: typed client for a leveraged-position margin protocol.
// wire fidelity first: every call encodes exactly what the deployed contract decodes.
// business rules live on chain; nothing here re-checks them.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: PositionId, LoanOffering, Position, PositionStatus
//   2.x  helpers.rs: position id derivation, interest rate scaling
//   3.x  abi.rs: IMargin bindings, calls and events
//   4.x  marshal.rs: address / uint256 / uint32 argument grouping
//   5.x  transport.rs: MarginTransport seam, call options, receipts, logs
//   6.x  margin/: facade: writes, reads, loans, event history
//   7.x  config.rs: network binding, default options, env presets
//   8.x  events.rs: decoded PositionOpened / PositionClosed records
//   9.x  simulated.rs: in-memory contract (mocked)

// protocol surface
pub mod abi;
pub mod events;
pub mod helpers;
pub mod margin;
pub mod marshal;
pub mod types;

// integration modules
pub mod config;
pub mod simulated;
pub mod transport;

// re exports for convenience
pub use config::MarginConfig;
pub use events::*;
pub use helpers::{
    convert_interest_rate_from_protocol, convert_interest_rate_to_protocol, get_position_id,
    INTEREST_RATE_SCALE,
};
pub use margin::{Margin, MarginError};
pub use simulated::SimulatedMargin;
pub use transport::{
    BlockTag, CallContext, CallOptions, LogFilter, MarginTransport, RawLog, TransportError,
    TxReceipt,
};
pub use types::*;
