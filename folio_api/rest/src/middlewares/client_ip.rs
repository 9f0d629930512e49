use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::{from_fn, Next},
    Router,
};
use tracing::{debug, error, warn};

use crate::RestServerRealIpConfig;

pub fn add<S: Clone + Send + Sync + 'static>(
    real_ip_config: Option<Arc<RestServerRealIpConfig>>,
) -> impl FnOnce(Router<S>) -> Router<S> {
    move |router| {
        router.layer(from_fn(
            move |connect_info: Option<ConnectInfo<SocketAddr>>,
                  mut request: Request,
                  next: Next| {
                let peer = connect_info.map(|ConnectInfo(addr)| addr.ip());
                let client_ip =
                    ClientIp::resolve(peer, request.headers(), real_ip_config.as_deref());
                request.extensions_mut().insert(client_ip);
                next.run(request)
            },
        ))
    }
}

/// Address of the client that sent the request, if known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    /// Determine the client address from the address of the connection
    /// (`peer`) and, for connections from the trusted proxy, the real ip
    /// header.
    fn resolve(
        peer: Option<IpAddr>,
        headers: &HeaderMap,
        real_ip_config: Option<&RestServerRealIpConfig>,
    ) -> Self {
        let Some(client_ip) = peer else {
            warn!("connection info missing, client address unknown");
            return Self(None);
        };

        let Some(RestServerRealIpConfig { header, set_from }) = real_ip_config else {
            return Self(Some(client_ip));
        };

        let header_value = headers.get(header);

        if *set_from != client_ip {
            if let Some(header_value) = header_value {
                debug!(%client_ip, ?header_value, "ignoring real ip header value from untrusted source");
            }
            return Self(Some(client_ip));
        }

        let Some(header_value) = header_value else {
            warn!(%client_ip, "real ip header not found");
            return Self(Some(client_ip));
        };

        let Some(real_ip) = header_value
            .to_str()
            .ok()
            .and_then(|real_ip| real_ip.trim().parse().ok())
        else {
            error!(%client_ip, ?header_value, "failed to parse real ip header value");
            return Self(Some(client_ip));
        };

        Self(Some(real_ip))
    }
}
