use futures_core::Stream;

use crate::AprsIsClient;
use crate::decode::PacketDecoder;
use crate::error::ClientError;

/// Convert an [`AprsIsClient`] into a [`Stream`] of decoded packets.
///
/// The stream owns the client, so only one consumer can read a session.
/// It logs in first when the client is not yet authenticated, yields
/// `Ok(packet)` per decoded line, and terminates with `None` on EOF or after
/// yielding a single `Err`. Dropping the stream drops the connection.
pub fn packet_stream<D: PacketDecoder>(
    mut client: AprsIsClient<D>,
) -> impl Stream<Item = Result<D::Packet, ClientError>> {
    async_stream::try_stream! {
        client.open().await?;
        while let Some(packet) = client.next_packet().await? {
            yield packet;
        }
    }
}
