//! Raw AF_PACKET transport to the FPGA receiver.
//!
//! Ethernet frames are built by hand (destination MAC, source MAC,
//! EtherType, payload) and handed straight to the NIC, no IP stack.
//! Opening the socket requires CAP_NET_RAW.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use crate::foundation::error::{LumyteError, LumyteResult};
use crate::wire::packet::DEST_MAC;

/// NIC the sign is cabled to unless configured otherwise.
pub const DEFAULT_INTERFACE: &str = "eth0";

const ETH_HEADER_LEN: usize = 14;

/// Something that can emit one Layer-2 payload with a given EtherType.
///
/// The frame pump writes through this trait so the packet stream can be
/// captured in tests without a raw socket.
pub trait LinkTx {
    /// Send one payload; returns the number of bytes handed to the link.
    fn send(&mut self, ether_type: u16, payload: &[u8]) -> LumyteResult<usize>;
}

/// A raw packet socket bound for the FPGA receiver on one interface.
pub struct RawLink {
    fd: OwnedFd,
    ifindex: libc::c_int,
    src_mac: [u8; 6],
    // Reused for every frame; sized for the largest payload seen so far.
    frame_buf: Vec<u8>,
}

impl RawLink {
    /// Open an AF_PACKET socket and resolve the interface index and MAC
    /// address of `interface`.
    pub fn open(interface: &str) -> LumyteResult<Self> {
        // Send-only: protocol 0 means we never receive anything.
        let fd = unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_RAW, 0) };
        if fd < 0 {
            return Err(LumyteError::link(io::Error::last_os_error()));
        }
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        let ifindex = nix::net::if_::if_nametoindex(interface)
            .map_err(|e| LumyteError::link(io::Error::from_raw_os_error(e as i32)))?;
        let src_mac = interface_mac(interface)?;

        Ok(Self {
            fd,
            ifindex: ifindex as libc::c_int,
            src_mac,
            frame_buf: Vec::with_capacity(ETH_HEADER_LEN + 1024),
        })
    }

    /// MAC address the link stamps as the Ethernet source.
    pub fn source_mac(&self) -> [u8; 6] {
        self.src_mac
    }
}

impl LinkTx for RawLink {
    fn send(&mut self, ether_type: u16, payload: &[u8]) -> LumyteResult<usize> {
        self.frame_buf.clear();
        self.frame_buf.extend_from_slice(&DEST_MAC);
        self.frame_buf.extend_from_slice(&self.src_mac);
        self.frame_buf.extend_from_slice(&ether_type.to_be_bytes());
        self.frame_buf.extend_from_slice(payload);

        let mut addr: libc::sockaddr_ll = unsafe { std::mem::zeroed() };
        addr.sll_family = libc::AF_PACKET as libc::c_ushort;
        addr.sll_ifindex = self.ifindex;
        addr.sll_halen = DEST_MAC.len() as libc::c_uchar;
        addr.sll_addr[..DEST_MAC.len()].copy_from_slice(&DEST_MAC);

        let sent = unsafe {
            libc::sendto(
                self.fd.as_raw_fd(),
                self.frame_buf.as_ptr().cast(),
                self.frame_buf.len(),
                0,
                (&addr as *const libc::sockaddr_ll).cast(),
                std::mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if sent < 0 {
            return Err(LumyteError::link(io::Error::last_os_error()));
        }
        Ok(sent as usize)
    }
}

/// Look up the hardware address of `interface` by name.
fn interface_mac(interface: &str) -> LumyteResult<[u8; 6]> {
    let addrs = nix::ifaddrs::getifaddrs()
        .map_err(|e| LumyteError::link(io::Error::from_raw_os_error(e as i32)))?;

    for ifaddr in addrs {
        if ifaddr.interface_name != interface {
            continue;
        }
        let mac = ifaddr
            .address
            .as_ref()
            .and_then(|addr| addr.as_link_addr())
            .and_then(|link| link.addr());
        if let Some(mac) = mac {
            return Ok(mac);
        }
    }

    Err(LumyteError::link(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no hardware address for interface {interface:?}"),
    )))
}
