//! 客户端 IP 提取
//!
//! 限流按连接对端地址计数，不信任 X-Forwarded-For，避免客户端伪造身份绕过限流。

use std::net::{IpAddr, SocketAddr};

use actix_web::dev::ConnectionInfo;

/// 从 `ip:port` 或纯 IP 字符串中取出 IP 部分
pub fn strip_port(addr: &str) -> Option<IpAddr> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        return Some(socket_addr.ip());
    }
    addr.parse::<IpAddr>().ok()
}

/// 从连接信息提取客户端 IP
pub fn extract_client_ip(conn_info: &ConnectionInfo) -> Option<String> {
    let peer = conn_info.peer_addr()?;
    Some(
        strip_port(peer)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| peer.to_string()),
    )
}
