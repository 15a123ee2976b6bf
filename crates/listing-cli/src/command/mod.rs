//! Command implementations.
//!
//! Each command wires the listing API client and, where needed, the
//! invalidation channel or an object store into one runtime component.

mod archive;
mod buckets;
mod signal;
mod upload;
mod watch;

pub use archive::archive;
pub use buckets::buckets;
use listing_nats::{NatsChannel, NatsClient};
pub use signal::signal;
pub use upload::upload;
pub use watch::watch;

use crate::config::ChannelArgs;

/// Connects to NATS and opens an invalidation channel over the connection.
async fn connect_channel(args: &ChannelArgs) -> anyhow::Result<NatsChannel> {
    let client = NatsClient::connect(args.nats.clone()).await?;
    Ok(NatsChannel::new(client))
}
