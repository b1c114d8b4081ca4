//! Next-hop denom path for a transfer packet
//!
//! A packet whose denom starts with the sending `port/channel/` is a voucher
//! going back over the channel it arrived on: the receiving chain unwinds that
//! hop. Anything else moves one hop further and gains the receiving
//! `port/channel/` prefix.

use crate::types::Packet;

/// Denom path of the token on the receiving chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextDenomPath {
    pub full_denom_path: String,
    /// The transfer unwinds a previous hop instead of adding one
    pub is_return: bool,
}

pub fn next_denom_path(packet: &Packet) -> NextDenomPath {
    let send_prefix = format!("{}/{}/", packet.source_port, packet.source_channel);
    let denom = &packet.data.denom;

    match denom.strip_prefix(&send_prefix) {
        Some(unwound) => NextDenomPath {
            full_denom_path: unwound.to_string(),
            is_return: true,
        },
        None => NextDenomPath {
            full_denom_path: format!(
                "{}/{}/{}",
                packet.destination_port, packet.destination_channel, denom
            ),
            is_return: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PacketData;

    fn packet(src_channel: &str, dst_channel: &str, denom: &str) -> Packet {
        Packet {
            source_port: "transfer".to_string(),
            source_channel: src_channel.to_string(),
            destination_port: "transfer".to_string(),
            destination_channel: dst_channel.to_string(),
            data: PacketData {
                denom: denom.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_return_hop_strips_prefix() {
        let next = next_denom_path(&packet("channel-5", "channel-2", "transfer/channel-5/uatom"));
        assert_eq!(
            next,
            NextDenomPath {
                full_denom_path: "uatom".to_string(),
                is_return: true,
            }
        );
    }

    #[test]
    fn test_forward_hop_prepends_destination() {
        let next = next_denom_path(&packet("channel-5", "channel-2", "uatom"));
        assert_eq!(next.full_denom_path, "transfer/channel-2/uatom");
        assert!(!next.is_return);
    }

    #[test]
    fn test_return_hop_strips_only_leading_prefix() {
        let next = next_denom_path(&packet(
            "channel-5",
            "channel-2",
            "transfer/channel-5/transfer/channel-5/uatom",
        ));
        assert_eq!(next.full_denom_path, "transfer/channel-5/uatom");
        assert!(next.is_return);
    }

    #[test]
    fn test_prefix_must_match_whole_channel() {
        // channel-5 is not a prefix match for channel-50
        let next = next_denom_path(&packet("channel-5", "channel-2", "transfer/channel-50/uatom"));
        assert_eq!(next.full_denom_path, "transfer/channel-2/transfer/channel-50/uatom");
        assert!(!next.is_return);
    }
}
